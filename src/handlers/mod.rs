// handlers/mod.rs - HTTP handlers
//
// create-project does the real work through ProjectService; health and the
// fallbacks never touch Nobl9.

pub mod fallback;
pub mod health;
pub mod project;

pub use fallback::{method_not_allowed, not_found};
pub use health::{health, HealthResponse};
pub use project::{create_project, CreateProjectData};
