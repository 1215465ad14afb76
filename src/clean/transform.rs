use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use super::config::DatePolicy;
use crate::dataset::{Dataset, Value};
use crate::etl::ETLError;

/// One step of the cleaning pipeline.
///
/// Steps own no state between calls: each consumes a dataset and returns
/// the cleaned replacement.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, dataset: Dataset) -> Result<Dataset, ETLError>;
}

/// Keeps the first row seen for each distinct key value.
#[derive(Debug, Clone)]
pub struct Deduplicate {
    key: String,
}

impl Deduplicate {
    pub fn new(key: impl Into<String>) -> Self {
        Deduplicate { key: key.into() }
    }
}

impl Transform for Deduplicate {
    fn name(&self) -> &str {
        "remove_duplicates"
    }

    fn apply(&self, dataset: Dataset) -> Result<Dataset, ETLError> {
        let idx = dataset.column_index(&self.key)?;

        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(dataset.len());
            dataset
                .rows()
                .iter()
                .map(|row| seen.insert(row[idx].key()))
                .collect()
        };

        let mut keep = keep.into_iter();
        Ok(dataset.retain_rows(|_| keep.next().unwrap_or(false)))
    }
}

/// Drops rows with no value in the required column. Other columns are left
/// as they are.
#[derive(Debug, Clone)]
pub struct HandleMissing {
    required: String,
}

impl HandleMissing {
    pub fn new(required: impl Into<String>) -> Self {
        HandleMissing {
            required: required.into(),
        }
    }
}

impl Transform for HandleMissing {
    fn name(&self) -> &str {
        "handle_missing_values"
    }

    fn apply(&self, dataset: Dataset) -> Result<Dataset, ETLError> {
        let idx = dataset.column_index(&self.required)?;
        debug!("missing values by column before handling: {:?}", dataset.null_counts());

        let dataset = dataset.retain_rows(|row| !row[idx].is_null());

        debug!("missing values by column after handling: {:?}", dataset.null_counts());
        Ok(dataset)
    }
}

/// Coerces an amount column to numbers and keeps rows strictly above the
/// lower bound. Non-numeric amounts count as outliers.
#[derive(Debug, Clone)]
pub struct RemoveOutliers {
    column: String,
    lower_bound: f64,
}

impl RemoveOutliers {
    pub fn new(column: impl Into<String>, lower_bound: f64) -> Self {
        RemoveOutliers {
            column: column.into(),
            lower_bound,
        }
    }
}

impl Transform for RemoveOutliers {
    fn name(&self) -> &str {
        "remove_outliers"
    }

    fn apply(&self, dataset: Dataset) -> Result<Dataset, ETLError> {
        let idx = dataset.column_index(&self.column)?;
        let bound = self.lower_bound;

        Ok(dataset
            .map_column(idx, |v| v.to_numeric().unwrap_or(Value::Null))
            .retain_rows(|row| row[idx].as_f64().is_some_and(|v| v > bound)))
    }
}

/// Overwrites the date column according to a [`DatePolicy`].
#[derive(Debug, Clone)]
pub struct StandardizeFormats {
    column: String,
    policy: DatePolicy,
}

impl StandardizeFormats {
    pub fn new(column: impl Into<String>, policy: DatePolicy) -> Self {
        StandardizeFormats {
            column: column.into(),
            policy,
        }
    }
}

impl Transform for StandardizeFormats {
    fn name(&self) -> &str {
        "standardize_formats"
    }

    fn apply(&self, dataset: Dataset) -> Result<Dataset, ETLError> {
        let idx = dataset.column_index(&self.column)?;

        let dataset = match &self.policy {
            DatePolicy::Fixed(literal) => {
                dataset.map_column(idx, |_| Value::Text(literal.clone()))
            }
            DatePolicy::Reformat {
                input_formats,
                output_format,
            } => dataset.map_column(idx, |v| {
                reformat_date(v, input_formats, output_format)
            }),
        };
        Ok(dataset)
    }
}

fn reformat_date(value: &Value, input_formats: &[String], output_format: &str) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    let text = value.to_string();
    std::iter::once(output_format)
        .chain(input_formats.iter().map(String::as_str))
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
        .map_or(Value::Null, |date| {
            Value::Text(date.format(output_format).to_string())
        })
}
