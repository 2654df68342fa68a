/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Coarse result of a create-project request.
/// The HTTP layer maps each category to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Success,
    BadRequest,
    Conflict,
    InternalError,
}

impl StatusCategory {
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCategory::Success)
    }
}
