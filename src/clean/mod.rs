pub mod config;
pub mod pipeline;
pub mod transform;

pub use config::{CleaningConfig, CleaningConfigBuilder, DEFAULT_SALE_DATE, DatePolicy};
pub use pipeline::{CleaningPipeline, StepReport};
pub use transform::{Deduplicate, HandleMissing, RemoveOutliers, StandardizeFormats, Transform};
