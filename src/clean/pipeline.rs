use tracing::{info, warn};

use super::config::CleaningConfig;
use super::transform::{Deduplicate, HandleMissing, RemoveOutliers, StandardizeFormats, Transform};
use crate::dataset::Dataset;
use crate::etl::ETLError;

/// Row counts around one executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StepReport {
    pub fn removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// An ordered list of transforms applied one after another.
///
/// Any failing step aborts the run; there is no retry.
pub struct CleaningPipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl CleaningPipeline {
    /// Creates a pipeline with no steps.
    pub fn new() -> Self {
        CleaningPipeline { steps: Vec::new() }
    }

    /// The sales cleaning order: de-duplicate, drop missing campaign,
    /// remove outliers, standardise formats.
    pub fn from_config(config: &CleaningConfig) -> Self {
        CleaningPipeline::new()
            .with_step(Deduplicate::new(config.dedup_key()))
            .with_step(HandleMissing::new(config.required_key()))
            .with_step(RemoveOutliers::new(
                config.amount_column(),
                config.lower_bound(),
            ))
            .with_step(StandardizeFormats::new(
                config.date_column(),
                config.date_policy().clone(),
            ))
    }

    pub fn with_step<S: Transform + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, dataset: Dataset) -> Result<Dataset, ETLError> {
        self.run_with_report(dataset).map(|(dataset, _)| dataset)
    }

    pub fn run_with_report(
        &self,
        dataset: Dataset,
    ) -> Result<(Dataset, Vec<StepReport>), ETLError> {
        let mut dataset = dataset;
        let mut reports = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let rows_before = dataset.len();
            info!(
                step = step.name(),
                rows = rows_before,
                columns = dataset.column_count(),
                "step start"
            );

            dataset = step.apply(dataset).inspect_err(|e| {
                warn!(step = step.name(), "step failed: {}", e);
            })?;

            let report = StepReport {
                step: step.name().to_string(),
                rows_before,
                rows_after: dataset.len(),
            };
            info!(
                step = step.name(),
                removed = report.removed(),
                remaining = report.rows_after,
                "step complete"
            );
            reports.push(report);
        }

        Ok((dataset, reports))
    }
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        CleaningPipeline::from_config(&CleaningConfig::default())
    }
}
