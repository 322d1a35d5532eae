//! Tributary server binary.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tributary_remote::select_remote;
use tributary_server::{AppState, Settings, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tributary v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("failed to load settings")?;

    // Fatal before binding.
    let remote = select_remote(&settings.remote).inspect_err(|e| {
        tracing::error!(error = %e, "Cannot start without a version control system");
    })?;

    let addr = settings
        .server
        .socket_addr()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                settings.server.host, settings.server.port
            )
        })?;
    tracing::info!(public_url = %settings.server.public_url, "Serving");

    run_server(addr, AppState::new(settings), remote).await?;

    Ok(())
}
