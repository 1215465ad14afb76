use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::types::ETLError;

/// Defines an ETL (Extract-Transform-Load) stage.
///
/// # Type Parameters
///
/// * `E` - What `extract()` produces
/// * `T` - What `transform()` turns it into
/// * `O` - Summary returned by `load()`
///
/// # Lifecycle
///
/// 1. `pre_process()` - Setup before extraction
/// 2. `extract()` - Read the stage's inputs
/// 3. `transform()` - Convert them in memory
/// 4. `load()` - Persist the result
/// 5. `post_process()` - Cleanup after loading
///
/// Steps run strictly in order and the first error ends the run.
#[async_trait]
pub trait ETLPipeline<E, T, O>
where
    E: Send,
    T: Send,
{
    /// Name used in log output.
    fn name(&self) -> &str;

    /// Pre-processing hook called before extraction starts.
    async fn pre_process(&self) -> Result<(), ETLError>;

    async fn extract(&self) -> Result<E, ETLError>;

    async fn transform(&self, extracted: E) -> Result<T, ETLError>;

    async fn load(&self, transformed: T) -> Result<O, ETLError>;

    /// Post-processing hook called after a successful load.
    async fn post_process(&self) -> Result<(), ETLError>;
}

/// Executor for a single ETL stage.
pub struct ETL<E, T, O> {
    etl: Arc<dyn ETLPipeline<E, T, O> + Send + Sync>,
}

impl<E, T, O> ETL<E, T, O>
where
    E: Send + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    pub fn new(etl: Arc<dyn ETLPipeline<E, T, O> + Send + Sync>) -> Self {
        ETL { etl }
    }

    /// Convenience constructor for when you have a `Box<dyn ETLPipeline>`.
    pub fn from_box(etl: Box<dyn ETLPipeline<E, T, O> + Send + Sync>) -> Self {
        ETL {
            etl: Arc::from(etl),
        }
    }

    pub fn name(&self) -> &str {
        self.etl.name()
    }

    /// Runs the whole lifecycle once.
    pub async fn run(&self) -> Result<O, ETLError> {
        let name = self.etl.name();
        info!(pipeline = name, "==================================");
        info!(pipeline = name, "starting");

        let result = self.run_steps().await;
        match &result {
            Ok(_) => info!(pipeline = name, "finished"),
            Err(e) => warn!(pipeline = name, "aborted: {}", e),
        }
        result
    }

    async fn run_steps(&self) -> Result<O, ETLError> {
        self.etl.pre_process().await?;
        let extracted = self.etl.extract().await?;
        let transformed = self.etl.transform(extracted).await?;
        let output = self.etl.load(transformed).await?;
        self.etl.post_process().await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingPipeline {
        calls: Mutex<Vec<&'static str>>,
        fail_transform: bool,
    }

    impl RecordingPipeline {
        fn new(fail_transform: bool) -> Self {
            RecordingPipeline {
                calls: Mutex::new(Vec::new()),
                fail_transform,
            }
        }

        fn record(&self, step: &'static str) {
            self.calls.lock().unwrap().push(step);
        }
    }

    #[async_trait]
    impl ETLPipeline<Vec<i32>, Vec<i32>, usize> for RecordingPipeline {
        fn name(&self) -> &str {
            "recording"
        }

        async fn pre_process(&self) -> Result<(), ETLError> {
            self.record("pre_process");
            Ok(())
        }

        async fn extract(&self) -> Result<Vec<i32>, ETLError> {
            self.record("extract");
            Ok(vec![3, -1, 4])
        }

        async fn transform(&self, extracted: Vec<i32>) -> Result<Vec<i32>, ETLError> {
            self.record("transform");
            if self.fail_transform {
                return Err(ETLError::Schema("bad column".to_string()));
            }
            Ok(extracted.into_iter().filter(|v| *v > 0).collect())
        }

        async fn load(&self, transformed: Vec<i32>) -> Result<usize, ETLError> {
            self.record("load");
            Ok(transformed.len())
        }

        async fn post_process(&self) -> Result<(), ETLError> {
            self.record("post_process");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_executes_lifecycle_in_order() {
        let pipeline = Arc::new(RecordingPipeline::new(false));
        let etl: ETL<Vec<i32>, Vec<i32>, usize> = ETL::new(pipeline.clone());

        let loaded = etl.run().await.unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(
            *pipeline.calls.lock().unwrap(),
            vec!["pre_process", "extract", "transform", "load", "post_process"]
        );
    }

    #[tokio::test]
    async fn test_run_stops_at_first_error() {
        let pipeline = Arc::new(RecordingPipeline::new(true));
        let etl: ETL<Vec<i32>, Vec<i32>, usize> = ETL::new(pipeline.clone());

        let err = etl.run().await.unwrap_err();

        assert!(matches!(err, ETLError::Schema(_)));
        assert_eq!(
            *pipeline.calls.lock().unwrap(),
            vec!["pre_process", "extract", "transform"]
        );
    }

    #[test]
    fn test_etl_from_box() {
        let etl: ETL<Vec<i32>, Vec<i32>, usize> =
            ETL::from_box(Box::new(RecordingPipeline::new(false)));
        assert_eq!(etl.name(), "recording");
    }
}
