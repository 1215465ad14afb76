use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use tracing::debug;

use super::types::ETLError;

pub const RAW_DIR_VAR: &str = "ETL_RAW_DIR";
pub const PREPARED_DIR_VAR: &str = "ETL_PREPARED_DIR";
pub const WAREHOUSE_PATH_VAR: &str = "ETL_WAREHOUSE_PATH";

/// Locations shared by both stages, resolved once at process start.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct PipelineConfig {
    /// Directory holding raw input files
    #[builder(default = "PathBuf::from(\"data/raw\")")]
    pub(crate) raw_dir: PathBuf,

    /// Directory the prepare stage writes to and the load stage reads from
    #[builder(default = "PathBuf::from(\"data/prepared\")")]
    pub(crate) prepared_dir: PathBuf,

    /// SQLite database file of the warehouse
    #[builder(default = "PathBuf::from(\"data/dw/smart_sales.db\")")]
    pub(crate) warehouse_path: PathBuf,
}

impl PipelineConfig {
    /// Builds a config from the environment, reading `.env` first if present.
    ///
    /// Unset variables fall back to the builder defaults.
    pub fn from_env() -> Result<Self, ETLError> {
        dotenvy::dotenv().ok();

        let mut builder = PipelineConfigBuilder::default();
        if let Ok(dir) = env::var(RAW_DIR_VAR) {
            builder.raw_dir(dir);
        }
        if let Ok(dir) = env::var(PREPARED_DIR_VAR) {
            builder.prepared_dir(dir);
        }
        if let Ok(path) = env::var(WAREHOUSE_PATH_VAR) {
            builder.warehouse_path(path);
        }
        builder
            .build()
            .map_err(|e| ETLError::Configuration(e.to_string()))
    }

    #[inline]
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    #[inline]
    pub fn prepared_dir(&self) -> &Path {
        &self.prepared_dir
    }

    #[inline]
    pub fn warehouse_path(&self) -> &Path {
        &self.warehouse_path
    }

    /// SQLite URL for the warehouse, creating the file on first connect.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.warehouse_path.display())
    }

    /// Creates the raw, prepared and warehouse directories if absent.
    pub fn ensure_dirs(&self) -> Result<(), ETLError> {
        let warehouse_dir = self
            .warehouse_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty());

        for dir in [Some(self.raw_dir.as_path()), Some(self.prepared_dir.as_path()), warehouse_dir]
            .into_iter()
            .flatten()
        {
            fs::create_dir_all(dir)?;
            debug!(dir = %dir.display(), "directory ready");
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            raw_dir: PathBuf::from("data/raw"),
            prepared_dir: PathBuf::from("data/prepared"),
            warehouse_path: PathBuf::from("data/dw/smart_sales.db"),
        }
    }
}
