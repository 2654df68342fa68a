use axum::extract::{rejection::StringRejection, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct CreateProjectData {
    pub project: String,
    pub assignment_count: usize,
}

/// POST /api/create-project - Create a project and its role bindings in one apply
#[tracing::instrument(name = "create_project", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<String, StringRejection>,
) -> ApiResult<CreateProjectData> {
    let body = body.map_err(body_rejection)?;

    let outcome = state.projects.handle_create(&body).await.into_result()?;

    let data = CreateProjectData {
        project: outcome.project.unwrap_or_default(),
        assignment_count: outcome.assignment_count.unwrap_or_default(),
    };
    Ok(ApiResponse::success(outcome.message, data))
}

fn body_rejection(rejection: StringRejection) -> ApiError {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body too large")
    } else {
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}
