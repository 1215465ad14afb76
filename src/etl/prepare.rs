use std::fs;

use async_trait::async_trait;
use tracing::info;

use super::config::PipelineConfig;
use super::processor::{ETL, ETLPipeline};
use super::types::ETLError;
use crate::clean::{CleaningConfig, CleaningPipeline, StepReport};
use crate::dataset::{CsvSink, CsvSource, Dataset, TabularSink, TabularSource};

pub const RAW_SALES_FILE: &str = "sales_data.csv";
pub const PREPARED_SALES_FILE: &str = "sales_prepared.csv";

/// Cleaned sales rows together with the counts that produced them.
#[derive(Debug, Clone)]
pub struct PreparedSales {
    pub dataset: Dataset,
    pub rows_in: usize,
    pub steps: Vec<StepReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns: usize,
    pub steps: Vec<StepReport>,
}

/// Reads the raw sales file, cleans it and writes the prepared file.
pub struct PrepareSalesPipeline {
    source: Box<dyn TabularSource + Send + Sync>,
    sink: Box<dyn TabularSink + Send + Sync>,
    cleaning: CleaningPipeline,
    config: Option<PipelineConfig>,
}

impl PrepareSalesPipeline {
    pub fn new(
        source: Box<dyn TabularSource + Send + Sync>,
        sink: Box<dyn TabularSink + Send + Sync>,
        cleaning: CleaningPipeline,
    ) -> Self {
        PrepareSalesPipeline {
            source,
            sink,
            cleaning,
            config: None,
        }
    }

    /// CSV source and sink in the configured raw and prepared directories.
    pub fn from_config(config: &PipelineConfig, cleaning: &CleaningConfig) -> Self {
        PrepareSalesPipeline {
            source: Box::new(CsvSource::new(config.raw_dir())),
            sink: Box::new(CsvSink::new(config.prepared_dir())),
            cleaning: CleaningPipeline::from_config(cleaning),
            config: Some(config.clone()),
        }
    }
}

#[async_trait]
impl ETLPipeline<Dataset, PreparedSales, PrepareSummary> for PrepareSalesPipeline {
    fn name(&self) -> &str {
        "prepare_sales_data"
    }

    async fn pre_process(&self) -> Result<(), ETLError> {
        if let Some(config) = &self.config {
            info!("data/raw     : {}", config.raw_dir().display());
            info!("data/prepared: {}", config.prepared_dir().display());
            fs::create_dir_all(config.raw_dir())?;
            fs::create_dir_all(config.prepared_dir())?;
        }
        Ok(())
    }

    async fn extract(&self) -> Result<Dataset, ETLError> {
        let dataset = self.source.read(RAW_SALES_FILE)?;
        info!("initial dataframe columns: {}", dataset.columns().join(", "));
        Ok(dataset)
    }

    async fn transform(&self, extracted: Dataset) -> Result<PreparedSales, ETLError> {
        let rows_in = extracted.len();
        let (dataset, steps) = self.cleaning.run_with_report(extracted)?;
        Ok(PreparedSales {
            dataset,
            rows_in,
            steps,
        })
    }

    async fn load(&self, transformed: PreparedSales) -> Result<PrepareSummary, ETLError> {
        self.sink.write(&transformed.dataset, PREPARED_SALES_FILE)?;
        Ok(PrepareSummary {
            rows_in: transformed.rows_in,
            rows_out: transformed.dataset.len(),
            columns: transformed.dataset.column_count(),
            steps: transformed.steps,
        })
    }

    async fn post_process(&self) -> Result<(), ETLError> {
        Ok(())
    }
}

/// Runs the prepare stage with the default cleaning rules.
pub async fn run_prepare(config: &PipelineConfig) -> Result<PrepareSummary, ETLError> {
    run_prepare_with(config, &CleaningConfig::default()).await
}

pub async fn run_prepare_with(
    config: &PipelineConfig,
    cleaning: &CleaningConfig,
) -> Result<PrepareSummary, ETLError> {
    let etl: ETL<Dataset, PreparedSales, PrepareSummary> =
        ETL::from_box(Box::new(PrepareSalesPipeline::from_config(config, cleaning)));
    let summary = etl.run().await?;
    info!(
        raw_rows = summary.rows_in,
        cleaned_rows = summary.rows_out,
        "sales data prepared"
    );
    Ok(summary)
}
