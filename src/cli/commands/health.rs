use anyhow::Context;
use serde_json::json;

use crate::cli::utils::{endpoint, output_success};
use crate::cli::OutputFormat;
use crate::handlers::HealthResponse;

pub async fn handle(server: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = endpoint(server, "/health");

    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("{} answered HTTP {}", url, status);
    }

    let health: HealthResponse = response
        .json()
        .await
        .with_context(|| format!("unexpected health payload from {}", url))?;

    output_success(
        &output_format,
        &format!(
            "{} is {} (version {}, {})",
            server, health.status, health.version, health.environment
        ),
        Some(json!(health)),
    )
}
