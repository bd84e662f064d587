use crate::core::session::Session;
use crate::domain::model::ExportArtifact;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs one upload through extract, resolve and load, and parks the finished
/// export on the session until the next batch.
pub struct ResolverEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
    session: Session,
}

impl<P: Pipeline> ResolverEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(&mut self) -> Result<ExportArtifact> {
        // A new upload invalidates the previously held export.
        self.session.clear();

        tracing::info!("📤 Reading uploaded spreadsheet...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} rows ({} columns)",
            dataset.rows.len(),
            dataset.columns.len()
        );
        self.monitor.log_stats("extract");

        tracing::info!("🔄 Resolving customer IDs...");
        let summary = self.pipeline.resolve(dataset).await?;
        tracing::info!(
            "Batch finished: {} resolved, {} empty, {} errors, {} invalid keys",
            summary.resolved,
            summary.empty,
            summary.errors,
            summary.invalid
        );
        self.monitor.log_stats("resolve");

        tracing::info!("📥 Exporting updated spreadsheet...");
        let artifact = self.pipeline.load(summary).await?;
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        self.session.set_export(artifact.clone());
        Ok(artifact)
    }
}
