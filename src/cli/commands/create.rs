use anyhow::Context;
use serde_json::Value;
use std::path::Path;

use crate::cli::utils::{endpoint, load_request, output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(file: &Path, server: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let request = load_request(file)?;
    let url = endpoint(server, "/api/create-project");

    let response = reqwest::Client::new()
        .post(&url)
        .json(&request)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", url))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("unexpected response from {} (HTTP {})", url, status))?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message in response")
        .to_string();

    if status.is_success() {
        output_success(&output_format, &message, body.get("data").cloned())
    } else {
        let code = body.get("code").and_then(Value::as_str);
        output_error(&output_format, &message, code)?;
        anyhow::bail!("create-project failed with HTTP {}", status)
    }
}
