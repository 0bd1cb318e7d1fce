use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

/// Drives a [`Pipeline`] through load, compile and emit.
pub struct CompilerEngine<P: Pipeline> {
    pipeline: P,
    monitor: PhaseMonitor,
}

impl<P: Pipeline> CompilerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: PhaseMonitor::new(monitor_enabled),
        }
    }

    pub fn monitor(&self) -> &PhaseMonitor {
        &self.monitor
    }

    /// Runs every phase and returns the directory the artifacts went to.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting compilation...");

        let started = self.monitor.start();
        let sources = self.pipeline.load_sources().await?;
        tracing::info!("📂 Loaded {} source files", sources.len());
        self.monitor.finish("load", started);

        let started = self.monitor.start();
        let result = self.pipeline.compile(sources).await?;
        tracing::info!(
            "🔧 Compiled {} files ({} statements)",
            result.units.len(),
            result.statement_count()
        );
        self.monitor.finish("compile", started);

        let started = self.monitor.start();
        let output_path = self.pipeline.emit(result).await?;
        tracing::info!("💾 Artifacts written to: {}", output_path);
        self.monitor.finish("emit", started);

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
