use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers;
use crate::nobl9::{Nobl9Error, Nobl9SessionProvider};
use crate::project::{SessionProvider, SystemClock};
use crate::services::ProjectService;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub projects: Arc<ProjectService>,
}

impl AppState {
    pub fn new(config: AppConfig, sessions: Arc<dyn SessionProvider>) -> Self {
        let projects = ProjectService::new(sessions, Arc::new(SystemClock), config.nobl9.timeout());
        Self::with_projects(config, projects)
    }

    pub fn with_projects(config: AppConfig, projects: ProjectService) -> Self {
        Self {
            config: Arc::new(config),
            projects: Arc::new(projects),
        }
    }

    /// Production wiring: sessions come from the Nobl9 API
    pub fn from_config(config: AppConfig) -> Result<Self, Nobl9Error> {
        let sessions = Nobl9SessionProvider::new(&config.nobl9)?;
        Ok(Self::new(config, Arc::new(sessions)))
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.api.max_request_size_bytes);
    let request_logging = state.config.api.enable_request_logging;

    let router = Router::new()
        .route("/health", get(handlers::health).fallback(handlers::method_not_allowed))
        .route(
            "/api/create-project",
            post(handlers::create_project).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors).layer(body_limit));

    if request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-amz-date"),
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
        ])
}
