use std::process::ExitCode;

use sales_etl::etl::{PipelineConfig, run_prepare};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("starting data preparation");

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_prepare(&config).await {
        Ok(summary) => {
            for step in &summary.steps {
                info!(
                    step = %step.step,
                    removed = step.removed(),
                    remaining = step.rows_after,
                    "cleaning step"
                );
            }
            info!(
                "wrote {} rows x {} columns to {}",
                summary.rows_out,
                summary.columns,
                config.prepared_dir().display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = %e.kind(), "data preparation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
