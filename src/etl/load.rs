use std::fs;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use sea_orm_migration::SchemaManager;
use tracing::{error, info, warn};

use super::config::PipelineConfig;
use super::processor::{ETL, ETLPipeline};
use super::types::{ETLError, ErrorKind};
use crate::dataset::{CsvSource, Dataset, TabularSource};
use crate::warehouse::{
    self, LoadConfig, LoadSummary, WarehouseLoader, WarehouseRows, WarehouseSchema,
    customer_rows, product_rows, sale_rows,
};

pub const CUSTOMERS_FILE: &str = "customers_prepared.csv";
pub const PRODUCTS_FILE: &str = "products_prepared.csv";
pub const SALES_FILE: &str = "sales_prepared.csv";

/// The three prepared datasets read by one load run.
#[derive(Debug, Clone)]
pub struct PreparedTables {
    pub customers: Dataset,
    pub products: Dataset,
    pub sales: Dataset,
}

/// Outcome of a warehouse load run.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Success(LoadSummary),
    Failure { kind: ErrorKind, detail: String },
}

impl LoadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadResult::Success(_))
    }
}

impl From<Result<LoadSummary, ETLError>> for LoadResult {
    fn from(result: Result<LoadSummary, ETLError>) -> Self {
        match result {
            Ok(summary) => LoadResult::Success(summary),
            Err(e) => LoadResult::Failure {
                kind: e.kind(),
                detail: e.to_string(),
            },
        }
    }
}

/// Replaces the warehouse contents with the prepared datasets.
///
/// The schema reset and all inserts share one transaction, so a failed run
/// leaves the previous warehouse as it was.
pub struct WarehouseLoadPipeline {
    source: Box<dyn TabularSource + Send + Sync>,
    database_url: String,
    loader: WarehouseLoader,
    config: Option<PipelineConfig>,
}

impl WarehouseLoadPipeline {
    pub fn new(
        source: Box<dyn TabularSource + Send + Sync>,
        database_url: impl Into<String>,
        loader: WarehouseLoader,
    ) -> Self {
        WarehouseLoadPipeline {
            source,
            database_url: database_url.into(),
            loader,
            config: None,
        }
    }

    pub fn from_config(config: &PipelineConfig, load: LoadConfig) -> Self {
        WarehouseLoadPipeline {
            source: Box::new(CsvSource::new(config.prepared_dir())),
            database_url: config.database_url(),
            loader: WarehouseLoader::new(load),
            config: Some(config.clone()),
        }
    }

    async fn load_in_transaction(
        &self,
        db: &DatabaseConnection,
        rows: WarehouseRows,
    ) -> Result<LoadSummary, ETLError> {
        let txn = db.begin().await?;
        match self.write(&txn, rows).await {
            Ok(summary) => {
                txn.commit().await?;
                Ok(summary)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!("rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    async fn write(
        &self,
        txn: &DatabaseTransaction,
        rows: WarehouseRows,
    ) -> Result<LoadSummary, ETLError> {
        info!("resetting warehouse schema");
        WarehouseSchema::reset(&SchemaManager::new(txn)).await?;
        self.loader.load(txn, rows).await
    }
}

#[async_trait]
impl ETLPipeline<PreparedTables, WarehouseRows, LoadSummary> for WarehouseLoadPipeline {
    fn name(&self) -> &str {
        "etl_to_dw"
    }

    async fn pre_process(&self) -> Result<(), ETLError> {
        if let Some(parent) = self
            .config
            .as_ref()
            .and_then(|c| c.warehouse_path().parent())
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    async fn extract(&self) -> Result<PreparedTables, ETLError> {
        Ok(PreparedTables {
            customers: self.source.read(CUSTOMERS_FILE)?,
            products: self.source.read(PRODUCTS_FILE)?,
            sales: self.source.read(SALES_FILE)?,
        })
    }

    async fn transform(&self, extracted: PreparedTables) -> Result<WarehouseRows, ETLError> {
        Ok(WarehouseRows {
            customers: customer_rows(extracted.customers)?,
            products: product_rows(extracted.products)?,
            sales: sale_rows(extracted.sales)?,
        })
    }

    async fn load(&self, transformed: WarehouseRows) -> Result<LoadSummary, ETLError> {
        let db = warehouse::connect(&self.database_url).await?;
        let result = self.load_in_transaction(&db, transformed).await;
        if let Err(e) = db.close().await {
            warn!("failed to close warehouse connection: {}", e);
        }
        result
    }

    async fn post_process(&self) -> Result<(), ETLError> {
        info!("data warehouse loaded successfully");
        Ok(())
    }
}

/// Runs the load stage with default loader settings.
pub async fn run_load(config: &PipelineConfig) -> LoadResult {
    run_load_with(config, LoadConfig::default()).await
}

/// Runs the load stage and reports the outcome instead of propagating it.
pub async fn run_load_with(config: &PipelineConfig, load: LoadConfig) -> LoadResult {
    let etl: ETL<PreparedTables, WarehouseRows, LoadSummary> =
        ETL::from_box(Box::new(WarehouseLoadPipeline::from_config(config, load)));

    let result = LoadResult::from(etl.run().await);
    match &result {
        LoadResult::Success(summary) => info!(
            customers = summary.customers,
            products = summary.products,
            sales = summary.sales,
            "warehouse load committed"
        ),
        LoadResult::Failure { kind, detail } => {
            error!(kind = %kind, "error loading data: {}", detail)
        }
    }
    result
}
