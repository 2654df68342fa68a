use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::model::{ManifestObject, UserHandle};

/// Directory lookup failed for reasons other than "no such user"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct LookupError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// Downstream reports that an object already exists
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Failed(String),
}

impl ApplyError {
    /// Conflicts are recognised by variant or, for opaque failures, by message
    pub fn is_conflict(&self) -> bool {
        match self {
            ApplyError::Conflict(_) => true,
            ApplyError::Failed(message) => {
                let message = message.to_lowercase();
                message.contains("already exists") || message.contains("conflict")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Failed to retrieve Nobl9 credentials: {0}")]
    Credentials(String),

    #[error("Failed to initialize Nobl9 client: {0}")]
    Client(String),
}

/// Resolves email-like identifiers to user handles
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// `Ok(None)` when the directory has no such user
    async fn lookup(&self, email: &str) -> Result<Option<UserHandle>, LookupError>;
}

/// Submits a batch of objects as one logical unit
#[async_trait]
pub trait Applier: Send + Sync {
    async fn apply(&self, objects: &[ManifestObject]) -> Result<(), ApplyError>;
}

/// Source of the timestamp embedded in generated names
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// Collaborators bound to one authenticated downstream session
#[derive(Clone)]
pub struct Session {
    pub lookup: Arc<dyn IdentityLookup>,
    pub applier: Arc<dyn Applier>,
}

/// Opens a fresh session for every request
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self) -> Result<Session, SessionError>;
}
