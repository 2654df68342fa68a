#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use nobl9_wizard::config::AppConfig;
use nobl9_wizard::project::{FixedClock, SessionProvider};
use nobl9_wizard::server::{app, AppState};
use nobl9_wizard::services::ProjectService;

pub const FIXED_TIMESTAMP: i64 = 1_700_000_000;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Credentials are stripped so create-project fails at session open
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nobl9-wizard"));
        cmd.env("WIZARD_API_HOST", "127.0.0.1")
            .env("WIZARD_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env_remove("NOBL9_CLIENT_ID")
            .env_remove("NOBL9_CLIENT_SECRET")
            .env_remove("SECURITY_CORS_ORIGINS")
            // Detached output so the test runner never waits on a shared pipe
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Development defaults with no process environment involved
pub fn test_config() -> AppConfig {
    AppConfig::from_vars(|_| None)
}

/// In-process router over the given sessions, with a pinned clock
pub fn test_app(sessions: Arc<dyn SessionProvider>) -> Router {
    test_app_with_deadline(sessions, Duration::from_secs(5))
}

pub fn test_app_with_deadline(sessions: Arc<dyn SessionProvider>, deadline: Duration) -> Router {
    let projects = ProjectService::new(sessions, Arc::new(FixedClock(FIXED_TIMESTAMP)), deadline);
    app(AppState::with_projects(test_config(), projects))
}

/// POST a raw body to /api/create-project and decode the JSON reply
pub async fn post_create(app: Router, body: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/create-project")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;

    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&bytes)
        .with_context(|| format!("response was not JSON: {}", String::from_utf8_lossy(&bytes)))?;
    Ok((status, json))
}
