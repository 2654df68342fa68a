use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::model::{
    Identifier, ManifestObject, Project, RoleBinding, UserHandle, ValidatedGroup, ValidatedRequest,
};
use super::naming::assignment_name;
use super::traits::{Applier, Clock, IdentityLookup};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// One or more identifiers could not be mapped to a user; nothing was written
    #[error("Failed to create project '{project_id}' because some users could not be found:\n• {}", .failures.join("\n• "))]
    Resolution {
        project_id: String,
        failures: Vec<String>,
    },

    #[error("Project '{0}' already exists")]
    Conflict(String),

    #[error("Failed to create project and assign roles: {0}")]
    Apply(String),
}

/// Project plus every role binding derived from the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub project: Project,
    pub bindings: Vec<RoleBinding>,
}

impl Reconciled {
    pub fn assignment_count(&self) -> usize {
        self.bindings.len()
    }

    /// The project first, then its bindings, as one apply batch
    pub fn objects(&self) -> Vec<ManifestObject> {
        std::iter::once(ManifestObject::Project(self.project.clone()))
            .chain(self.bindings.iter().cloned().map(ManifestObject::RoleBinding))
            .collect()
    }

    pub fn message(&self) -> String {
        format!(
            "Project '{}' created successfully with {} user role assignments",
            self.project.name,
            self.assignment_count()
        )
    }
}

struct Resolved<'r> {
    group: &'r ValidatedGroup,
    identifier: &'r Identifier,
    user: UserHandle,
}

/// Turns a validated request into one apply batch.
///
/// Every identifier is resolved before anything is written; if any of them
/// fails the whole request is rejected with all failures listed.
pub struct Reconciler<'a> {
    lookup: &'a dyn IdentityLookup,
    applier: &'a dyn Applier,
    clock: &'a dyn Clock,
}

impl<'a> Reconciler<'a> {
    pub fn new(lookup: &'a dyn IdentityLookup, applier: &'a dyn Applier, clock: &'a dyn Clock) -> Self {
        Self {
            lookup,
            applier,
            clock,
        }
    }

    pub async fn reconcile(&self, request: &ValidatedRequest) -> Result<Reconciled, ReconcileError> {
        let reconciled = self.plan(request).await?;
        let objects = reconciled.objects();

        info!(
            "Applying {} objects to Nobl9 (1 project + {} role bindings)",
            objects.len(),
            reconciled.assignment_count()
        );

        self.applier.apply(&objects).await.map_err(|err| {
            if err.is_conflict() {
                warn!("Project '{}' already exists: {}", request.project_id, err);
                ReconcileError::Conflict(request.project_id.clone())
            } else {
                error!("Failed to create project and assign roles: {}", err);
                ReconcileError::Apply(err.to_string())
            }
        })?;

        info!(
            "Successfully created project '{}' and applied {} role bindings",
            reconciled.project.name,
            reconciled.assignment_count()
        );
        Ok(reconciled)
    }

    /// Resolve identities and name every binding without writing anything
    pub async fn plan(&self, request: &ValidatedRequest) -> Result<Reconciled, ReconcileError> {
        let project = Project::for_request(request);
        info!(
            "Preparing project '{}' with description: {}",
            project.name, project.description
        );

        // one lookup at a time against the directory, in request order
        let mut results: Vec<Result<Resolved<'_>, String>> =
            Vec::with_capacity(request.identifier_count());
        for group in &request.groups {
            for identifier in &group.identifiers {
                results.push(self.resolve(group, identifier).await);
            }
        }

        let (resolved, failures) = results.into_iter().fold(
            (Vec::new(), Vec::new()),
            |(mut resolved, mut failures), result| {
                match result {
                    Ok(item) => resolved.push(item),
                    Err(failure) => failures.push(failure),
                }
                (resolved, failures)
            },
        );

        if !failures.is_empty() {
            let err = ReconcileError::Resolution {
                project_id: request.project_id.clone(),
                failures,
            };
            warn!("{}", err);
            return Err(err);
        }

        let bindings = self.bind(request, resolved);
        Ok(Reconciled { project, bindings })
    }

    async fn resolve<'r>(
        &self,
        group: &'r ValidatedGroup,
        identifier: &'r Identifier,
    ) -> Result<Resolved<'r>, String> {
        let user = match identifier {
            Identifier::Email(email) => {
                debug!("Looking up user by email: {}", email);
                match self.lookup.lookup(email).await {
                    Ok(Some(user)) => {
                        debug!("Found user: {} -> {}", email, user);
                        user
                    }
                    Ok(None) => {
                        let failure = format!(
                            "User with email '{}' in group {} not found in Nobl9",
                            email, group.index
                        );
                        warn!("{}", failure);
                        return Err(failure);
                    }
                    Err(err) => {
                        let failure = format!(
                            "Error retrieving user '{}' in group {}: {}",
                            email, group.index, err
                        );
                        warn!("{}", failure);
                        return Err(failure);
                    }
                }
            }
            Identifier::UserId(id) => {
                debug!("Using provided user ID: {}", id);
                UserHandle::new(id.as_str())
            }
        };

        Ok(Resolved {
            group,
            identifier,
            user,
        })
    }

    fn bind(&self, request: &ValidatedRequest, resolved: Vec<Resolved<'_>>) -> Vec<RoleBinding> {
        let timestamp = self.clock.now_unix();
        let mut taken = HashSet::new();

        resolved
            .into_iter()
            .map(|item| {
                let mut ordinal = 0;
                let mut name = assignment_name(
                    &request.project_id,
                    item.identifier.as_str(),
                    item.group.index,
                    timestamp,
                    ordinal,
                );
                while !taken.insert(name.clone()) {
                    ordinal += 1;
                    name = assignment_name(
                        &request.project_id,
                        item.identifier.as_str(),
                        item.group.index,
                        timestamp,
                        ordinal,
                    );
                }

                debug!(
                    "Prepared role binding {} for user {} with role {}",
                    name, item.user, item.group.role
                );
                RoleBinding {
                    name,
                    user: item.user,
                    role: item.group.role,
                    project_ref: request.project_id.clone(),
                    group_index: item.group.index,
                }
            })
            .collect()
    }
}
