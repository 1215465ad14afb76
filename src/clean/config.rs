// src/clean/config.rs

use derive_builder::Builder;

/// Literal the sales date column is overwritten with by default.
pub const DEFAULT_SALE_DATE: &str = "5/4/25";

/// How the date column is normalised.
#[derive(Debug, Clone, PartialEq)]
pub enum DatePolicy {
    /// Every row receives the same literal.
    Fixed(String),
    /// Each date is parsed with one of `input_formats` and rendered with
    /// `output_format`; unparseable dates become null.
    Reformat {
        input_formats: Vec<String>,
        output_format: String,
    },
}

impl Default for DatePolicy {
    fn default() -> Self {
        DatePolicy::Fixed(DEFAULT_SALE_DATE.to_string())
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct CleaningConfig {
    /// Column whose first occurrence is kept during de-duplication
    #[builder(default = "\"TransactionID\".to_string()")]
    pub(crate) dedup_key: String,

    /// Rows with a null in this column are dropped
    #[builder(default = "\"CampaignID\".to_string()")]
    pub(crate) required_key: String,

    /// Column filtered for non-numeric and out-of-range amounts
    #[builder(default = "\"SaleAmount\".to_string()")]
    pub(crate) amount_column: String,

    /// Exclusive lower bound for the amount column
    #[builder(default = "1.0")]
    pub(crate) lower_bound: f64,

    #[builder(default = "\"SaleDate\".to_string()")]
    pub(crate) date_column: String,

    #[builder(default)]
    pub(crate) date_policy: DatePolicy,
}

impl CleaningConfig {
    #[inline]
    pub fn dedup_key(&self) -> &str {
        &self.dedup_key
    }

    #[inline]
    pub fn required_key(&self) -> &str {
        &self.required_key
    }

    #[inline]
    pub fn amount_column(&self) -> &str {
        &self.amount_column
    }

    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    #[inline]
    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    #[inline]
    pub fn date_policy(&self) -> &DatePolicy {
        &self.date_policy
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        CleaningConfig {
            dedup_key: "TransactionID".to_string(),
            required_key: "CampaignID".to_string(),
            amount_column: "SaleAmount".to_string(),
            lower_bound: 1.0,
            date_column: "SaleDate".to_string(),
            date_policy: DatePolicy::default(),
        }
    }
}
