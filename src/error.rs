// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::CreateOutcome;
use crate::types::StatusCategory;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code()
        })
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Map a failed outcome category onto its HTTP error
    pub fn from_category(status: StatusCategory, message: impl Into<String>) -> Self {
        match status {
            StatusCategory::BadRequest => ApiError::bad_request(message),
            StatusCategory::Conflict => ApiError::conflict(message),
            // success outcomes are passed through by `CreateOutcome::into_result`
            StatusCategory::Success | StatusCategory::InternalError => {
                ApiError::internal_server_error(message)
            }
        }
    }
}

impl CreateOutcome {
    /// Success passes through; any other category becomes its HTTP error
    pub fn into_result(self) -> Result<CreateOutcome, ApiError> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(ApiError::from_category(self.status, self.message))
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_shape() {
        let err = ApiError::conflict("Project 'payments' already exists");
        assert_eq!(err.status_code(), 409);
        assert_eq!(
            err.to_json(),
            json!({
                "success": false,
                "message": "Project 'payments' already exists",
                "code": "CONFLICT"
            })
        );
    }

    #[test]
    fn outcome_into_result_maps_failures_to_status_codes() {
        let failed = |status| CreateOutcome {
            status,
            message: "boom".to_string(),
            project: None,
            assignment_count: None,
        };

        let status_of = |status| failed(status).into_result().map_err(|err| err.status_code());
        assert_eq!(status_of(StatusCategory::BadRequest).unwrap_err(), 400);
        assert_eq!(status_of(StatusCategory::Conflict).unwrap_err(), 409);
        assert_eq!(status_of(StatusCategory::InternalError).unwrap_err(), 500);

        let passed = failed(StatusCategory::Success).into_result().unwrap();
        assert_eq!(passed.message, "boom");
    }
}
