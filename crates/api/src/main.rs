//! Vitals Pipeline - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = Settings::load()?;

    info!("=== Vitals Pipeline v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Vendor fallback configured: {}",
        settings.pipeline.vendor.wrapper_path.is_some()
    );

    run_server(settings).await
}
