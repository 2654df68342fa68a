mod common;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use nobl9_wizard::cli::commands::{create, health};
use nobl9_wizard::cli::OutputFormat;
use nobl9_wizard::project::memory::{MemoryDirectory, RecordingApplier, StaticSessions};
use nobl9_wizard::project::{ApplyError, ManifestObject, UserHandle};

const REQUEST: &str = r#"{
    "appID": "payments",
    "userGroups": [{"userIds": "alice@example.com, 00u-bob", "role": "project-owner"}]
}"#;

/// Serve the router over real TCP so the CLI's HTTP client can reach it
async fn serve(applier: Arc<RecordingApplier>) -> Result<String> {
    let directory = MemoryDirectory::new().with_user("alice@example.com", "00u-alice");
    let sessions = Arc::new(StaticSessions::new(Arc::new(directory), applier));
    let router = common::test_app(sessions);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(base_url)
}

fn request_file(dir: &tempfile::TempDir) -> Result<PathBuf> {
    let path = dir.path().join("request.json");
    std::fs::write(&path, REQUEST)?;
    Ok(path)
}

#[tokio::test]
async fn create_command_submits_request_to_server() -> Result<()> {
    let applier = Arc::new(RecordingApplier::new());
    let base_url = serve(applier.clone()).await?;
    let dir = tempfile::tempdir()?;

    create::handle(&request_file(&dir)?, &base_url, OutputFormat::Json).await?;

    let batches = applier.batches();
    assert_eq!(batches.len(), 1);
    let users: Vec<_> = batches[0]
        .iter()
        .filter_map(|object| match object {
            ManifestObject::RoleBinding(binding) => Some(binding.user.clone()),
            ManifestObject::Project(_) => None,
        })
        .collect();
    assert_eq!(users, vec![UserHandle::new("00u-alice"), UserHandle::new("00u-bob")]);
    Ok(())
}

#[tokio::test]
async fn create_command_fails_on_conflict() -> Result<()> {
    let applier = Arc::new(RecordingApplier::failing(ApplyError::Conflict(
        "project payments already exists".to_string(),
    )));
    let base_url = serve(applier).await?;
    let dir = tempfile::tempdir()?;

    let err = create::handle(&request_file(&dir)?, &base_url, OutputFormat::Text)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("409"), "unexpected error: {}", err);
    Ok(())
}

#[tokio::test]
async fn health_command_reads_server_status() -> Result<()> {
    let base_url = serve(Arc::new(RecordingApplier::new())).await?;

    health::handle(&base_url, OutputFormat::Json).await?;
    health::handle(&format!("{}/", base_url), OutputFormat::Text).await?;
    Ok(())
}

#[tokio::test]
async fn health_command_fails_when_nothing_listens() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("no free port");
    let result = health::handle(&format!("http://127.0.0.1:{}", port), OutputFormat::Text).await;
    assert!(result.is_err());
    Ok(())
}
