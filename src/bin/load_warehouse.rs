use std::process::ExitCode;

use sales_etl::etl::{LoadResult, PipelineConfig, run_load};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("starting ETL to data warehouse");

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(warehouse = %config.warehouse_path().display(), "loading prepared data");

    match run_load(&config).await {
        LoadResult::Success(summary) => {
            if summary.orphan_sales > 0 {
                info!(
                    orphan_sales = summary.orphan_sales,
                    "loaded sales with unknown customer or product"
                );
            }
            ExitCode::SUCCESS
        }
        LoadResult::Failure { .. } => ExitCode::FAILURE,
    }
}
