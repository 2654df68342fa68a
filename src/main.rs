use anyhow::Context;
use tracing_subscriber::EnvFilter;

use nobl9_wizard::config::AppConfig;
use nobl9_wizard::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up NOBL9_CLIENT_ID, NOBL9_CLIENT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Nobl9 wizard API in {} mode", config.environment.as_str());
    if !config.nobl9.has_credentials() {
        tracing::warn!("Nobl9 credentials are not configured; create-project requests will fail");
    }

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(config).context("failed to initialize Nobl9 client")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Nobl9 wizard API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
