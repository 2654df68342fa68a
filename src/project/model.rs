use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Manifest API version accepted by the Nobl9 apply endpoint
pub const API_VERSION: &str = "n9/v1alpha";

/// Raw create-project payload as posted by the wizard frontend.
///
/// Every field defaults to empty so that a missing `appID` or `userGroups`
/// is reported by the validator instead of the JSON parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProjectRequest {
    /// Name of the project to create
    #[serde(rename = "appID")]
    pub app_id: String,
    /// Optional project description
    pub description: String,
    /// Groups of users with the role each group receives
    #[serde(rename = "userGroups")]
    pub user_groups: Vec<UserGroup>,
}

/// A comma-separated list of user IDs or emails sharing one role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroup {
    #[serde(rename = "userIds")]
    pub user_ids: String,
    pub role: String,
}

/// Project roles that can be granted through the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    ProjectOwner,
    ProjectViewer,
    ProjectEditor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::ProjectOwner, Role::ProjectViewer, Role::ProjectEditor];

    /// Exact, case-sensitive match against the literal role names
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ProjectOwner => "project-owner",
            Role::ProjectViewer => "project-viewer",
            Role::ProjectEditor => "project-editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single trimmed token from a group's `userIds`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Identifier {
    /// Email address, resolved through the identity directory
    Email(String),
    /// Opaque user ID, used as the user handle as-is
    UserId(String),
}

impl Identifier {
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Email(value) | Identifier::UserId(value) => value,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical user handle in the downstream system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserHandle(pub String);

impl UserHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request that passed every syntactic check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRequest {
    pub project_id: String,
    pub description: String,
    pub groups: Vec<ValidatedGroup>,
}

impl ValidatedRequest {
    pub fn identifier_count(&self) -> usize {
        self.groups.iter().map(|group| group.identifiers.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedGroup {
    /// Position of the group in the request
    pub index: usize,
    pub role: Role,
    pub identifiers: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub name: String,
    pub description: String,
}

impl Project {
    /// Build the project object, falling back to a generated description
    pub fn for_request(request: &ValidatedRequest) -> Self {
        let description = if request.description.is_empty() {
            format!("Project created via API: {}", request.project_id)
        } else {
            request.description.clone()
        };

        Self {
            name: request.project_id.clone(),
            description,
        }
    }
}

/// Grants one role to one user within one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleBinding {
    pub name: String,
    pub user: UserHandle,
    pub role: Role,
    pub project_ref: String,
    pub group_index: usize,
}

/// Object submitted to the apply endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestObject {
    Project(Project),
    RoleBinding(RoleBinding),
}

impl ManifestObject {
    pub fn kind(&self) -> &'static str {
        match self {
            ManifestObject::Project(_) => "Project",
            ManifestObject::RoleBinding(_) => "RoleBinding",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ManifestObject::Project(project) => &project.name,
            ManifestObject::RoleBinding(binding) => &binding.name,
        }
    }

    /// Render in the `apiVersion`/`kind`/`metadata`/`spec` manifest layout
    pub fn to_manifest(&self) -> Value {
        match self {
            ManifestObject::Project(project) => json!({
                "apiVersion": API_VERSION,
                "kind": self.kind(),
                "metadata": { "name": project.name },
                "spec": { "description": project.description }
            }),
            ManifestObject::RoleBinding(binding) => json!({
                "apiVersion": API_VERSION,
                "kind": self.kind(),
                "metadata": { "name": binding.name },
                "spec": {
                    "user": binding.user,
                    "roleRef": binding.role,
                    "projectRef": binding.project_ref
                }
            }),
        }
    }
}

impl Serialize for ManifestObject {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_manifest().serialize(serializer)
    }
}
