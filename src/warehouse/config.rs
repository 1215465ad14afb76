// src/warehouse/config.rs

use derive_builder::Builder;

/// What to do with sales whose customer or product is not being loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Log a warning and insert them anyway.
    #[default]
    Warn,
    /// Fail the load before anything is inserted.
    Reject,
}

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct LoadConfig {
    /// Rows per INSERT statement
    #[builder(default = "500")]
    pub(crate) batch_size: usize,

    #[builder(default)]
    pub(crate) orphan_policy: OrphanPolicy,
}

impl LoadConfig {
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            batch_size: 500,
            orphan_policy: OrphanPolicy::default(),
        }
    }
}
