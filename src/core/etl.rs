use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting heat index run");

        // Extract
        let extracted = self.pipeline.extract().await?;
        tracing::info!(
            "📡 Fetched {} sources ({} fetch warnings)",
            extracted.inputs.len(),
            extracted.warnings.len()
        );

        // Transform
        let issue = self.pipeline.transform(extracted).await?;
        tracing::info!(
            "🔥 Ranked {} of {} restaurants from {} mentions",
            issue.entities.len(),
            issue.stats.total_entities,
            issue.stats.total_mentions
        );
        if issue.is_empty() {
            tracing::warn!("Issue has no entities; every source failed or came back empty");
        }

        // Load
        let output_path = self.pipeline.load(issue).await?;
        tracing::info!("📁 Issue saved to: {}", output_path);

        Ok(output_path)
    }
}
