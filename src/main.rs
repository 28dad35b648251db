use anyhow::Context;
use docker_client::DockerRuntime;
use tracing::{error, info};
use volume_core::{GcConfig, ReconciliationEngine};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment-based filtering
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = GcConfig::from_env();
    info!("Cleaning volumes under {}", config.runtime_root.display());

    let runtime = DockerRuntime::connect()
        .await
        .context("failed to connect to the container runtime")?;

    let engine = ReconciliationEngine::new(runtime, config.layout());
    match engine.run().await {
        Ok(report) => {
            info!(
                "Done: {} of {} volumes removed, {} paths deleted",
                report.removed_volumes.len(),
                report.managed_count,
                report.removed_paths.len()
            );
            Ok(())
        }
        Err(e) => {
            error!("Volume cleanup failed: {}", e);
            Err(e).context("volume cleanup aborted")
        }
    }
}
