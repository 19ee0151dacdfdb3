use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct BatchRunner<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BatchRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting batch classification...");

        // Extract
        let input = self.pipeline.extract().await?;
        tracing::info!("Read {} flight record(s)", input.len());

        // Transform
        let report = self.pipeline.transform(input).await?;
        if !report.is_complete() {
            tracing::warn!(
                "⚠️ {} route(s) could not be classified",
                report.failures.len()
            );
        }

        // Load
        let output = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output);

        Ok(output)
    }
}
