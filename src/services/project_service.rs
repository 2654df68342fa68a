use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::project::{
    validate, Clock, CreateProjectRequest, Reconciled, ReconcileError, Reconciler, SessionError,
    SessionProvider, ValidationError,
};
use crate::types::StatusCategory;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Timed out after {}s waiting for Nobl9", .0.as_secs())]
    Timeout(Duration),
}

impl ServiceError {
    pub fn status(&self) -> StatusCategory {
        match self {
            ServiceError::MalformedRequest(_) | ServiceError::Validation(_) => {
                StatusCategory::BadRequest
            }
            ServiceError::Reconcile(ReconcileError::Resolution { .. }) => StatusCategory::BadRequest,
            ServiceError::Reconcile(ReconcileError::Conflict(_)) => StatusCategory::Conflict,
            ServiceError::Reconcile(ReconcileError::Apply(_))
            | ServiceError::Session(_)
            | ServiceError::Timeout(_) => StatusCategory::InternalError,
        }
    }
}

/// Result of one create-project invocation, independent of transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOutcome {
    pub status: StatusCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_count: Option<usize>,
}

impl From<Reconciled> for CreateOutcome {
    fn from(reconciled: Reconciled) -> Self {
        Self {
            status: StatusCategory::Success,
            message: reconciled.message(),
            assignment_count: Some(reconciled.assignment_count()),
            project: Some(reconciled.project.name),
        }
    }
}

impl From<ServiceError> for CreateOutcome {
    fn from(err: ServiceError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
            project: None,
            assignment_count: None,
        }
    }
}

/// Entry point for project creation: parse, validate, then reconcile
/// against a freshly opened downstream session.
pub struct ProjectService {
    sessions: Arc<dyn SessionProvider>,
    clock: Arc<dyn Clock>,
    deadline: Duration,
}

impl ProjectService {
    pub fn new(sessions: Arc<dyn SessionProvider>, clock: Arc<dyn Clock>, deadline: Duration) -> Self {
        Self {
            sessions,
            clock,
            deadline,
        }
    }

    /// Handle a raw request body and report the outcome; never fails
    pub async fn handle_create(&self, body: &str) -> CreateOutcome {
        match self.create(body).await {
            Ok(reconciled) => reconciled.into(),
            Err(err) => {
                match err.status() {
                    StatusCategory::InternalError => error!("{}", err),
                    _ => warn!("{}", err),
                }
                err.into()
            }
        }
    }

    pub async fn create(&self, body: &str) -> Result<Reconciled, ServiceError> {
        debug!("Processing create project request: {}", body);

        let request = parse_request(body)?;
        let validated = validate(&request)?;
        info!(
            "Request validation passed for project '{}' ({} user identifiers)",
            validated.project_id,
            validated.identifier_count()
        );

        let downstream = async {
            let session = self.sessions.open().await?;
            let reconciler =
                Reconciler::new(session.lookup.as_ref(), session.applier.as_ref(), self.clock.as_ref());
            Ok::<_, ServiceError>(reconciler.reconcile(&validated).await?)
        };

        tokio::time::timeout(self.deadline, downstream)
            .await
            .map_err(|_| ServiceError::Timeout(self.deadline))?
    }
}

/// Decode the JSON payload; an empty body is rejected up front
pub fn parse_request(body: &str) -> Result<CreateProjectRequest, ServiceError> {
    if body.trim().is_empty() {
        return Err(ServiceError::MalformedRequest("request body is empty".to_string()));
    }
    serde_json::from_str(body).map_err(|e| ServiceError::MalformedRequest(e.to_string()))
}
