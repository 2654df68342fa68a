pub mod project_service;

pub use project_service::{parse_request, CreateOutcome, ProjectService, ServiceError};
