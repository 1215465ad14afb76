pub mod config;
pub mod load;
pub mod prepare;
pub mod processor;
pub mod types;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use load::{LoadResult, PreparedTables, WarehouseLoadPipeline, run_load, run_load_with};
pub use prepare::{PrepareSalesPipeline, PrepareSummary, PreparedSales, run_prepare, run_prepare_with};
pub use processor::{ETL, ETLPipeline};
pub use types::{ETLError, ErrorKind};

#[cfg(test)]
mod tests;
