//! In-memory collaborators.
//!
//! Used by the `wizard plan` dry run and by tests that need to observe what
//! would have been sent downstream.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::model::{ManifestObject, UserHandle};
use super::traits::{
    Applier, ApplyError, IdentityLookup, LookupError, Session, SessionError, SessionProvider,
};

/// Directory backed by a map of email to user handle
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: HashMap<String, UserHandle>,
    failures: HashMap<String, String>,
    echo_unknown: bool,
    lookups: Mutex<Vec<String>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that resolves every email to itself
    pub fn echo() -> Self {
        Self {
            echo_unknown: true,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, email: &str, handle: &str) -> Self {
        self.users.insert(email.to_string(), UserHandle::new(handle));
        self
    }

    /// Make lookups for `email` fail with `message`
    pub fn with_failure(mut self, email: &str, message: &str) -> Self {
        self.failures.insert(email.to_string(), message.to_string());
        self
    }

    /// Every email looked up so far, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl IdentityLookup for MemoryDirectory {
    async fn lookup(&self, email: &str) -> Result<Option<UserHandle>, LookupError> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email.to_string());

        if let Some(message) = self.failures.get(email) {
            return Err(LookupError(message.clone()));
        }
        match self.users.get(email) {
            Some(handle) => Ok(Some(handle.clone())),
            None if self.echo_unknown => Ok(Some(UserHandle::new(email))),
            None => Ok(None),
        }
    }
}

/// Applier that records each batch instead of sending it
#[derive(Debug, Default)]
pub struct RecordingApplier {
    batches: Mutex<Vec<Vec<ManifestObject>>>,
    failure: Option<ApplyError>,
}

impl RecordingApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the batch, then answers with `failure`
    pub fn failing(failure: ApplyError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<ManifestObject>> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Applier for RecordingApplier {
    async fn apply(&self, objects: &[ManifestObject]) -> Result<(), ApplyError> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(objects.to_vec());

        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

/// Hands out the same collaborators for every request
pub struct StaticSessions {
    outcome: Result<Session, SessionError>,
    opened: Mutex<usize>,
}

impl StaticSessions {
    pub fn new(lookup: Arc<dyn IdentityLookup>, applier: Arc<dyn Applier>) -> Self {
        Self {
            outcome: Ok(Session { lookup, applier }),
            opened: Mutex::new(0),
        }
    }

    pub fn unavailable(error: SessionError) -> Self {
        Self {
            outcome: Err(error),
            opened: Mutex::new(0),
        }
    }

    /// Number of sessions requested so far
    pub fn opened(&self) -> usize {
        *self.opened.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionProvider for StaticSessions {
    async fn open(&self) -> Result<Session, SessionError> {
        *self.opened.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.outcome.clone()
    }
}
