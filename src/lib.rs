//! # sales-etl
//!
//! Batch ETL for the smart sales data warehouse, built on Tokio and SeaORM.
//!
//! ## Stages
//!
//! - **Prepare** reads `sales_data.csv`, removes duplicate transactions,
//!   rows without a campaign and non-positive or non-numeric amounts, then
//!   writes `sales_prepared.csv`.
//! - **Load** resets the SQLite warehouse schema and inserts the prepared
//!   customers, products and sales in one transaction.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sales_etl::etl::{PipelineConfig, run_load, run_prepare};
//!
//! let config = PipelineConfig::from_env()?;
//! run_prepare(&config).await?;
//! let result = run_load(&config).await;
//! assert!(result.is_success());
//! ```
//!
//! ## Modules
//!
//! - [`dataset`] - In-memory tables and CSV reading/writing
//! - [`clean`] - Cleaning steps and the ordered cleaning pipeline
//! - [`warehouse`] - Entities, schema management and the bulk loader
//! - [`etl`] - Stage pipelines, configuration and error types

pub mod clean;
pub mod dataset;
pub mod etl;
pub mod warehouse;
