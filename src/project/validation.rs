use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::model::{CreateProjectRequest, Identifier, Role, UserGroup, ValidatedGroup, ValidatedRequest};

pub const MIN_PROJECT_NAME_LEN: usize = 3;
pub const MAX_PROJECT_NAME_LEN: usize = 63;
pub const MIN_USER_ID_LEN: usize = 2;

/// Fragments that mark a token as an intended email even without an `@`
const EMAIL_DOMAIN_HINTS: &[&str] = &[".com", ".org", ".net", ".edu", ".gov", ".co.", ".io", ".dev"];

static PROJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid project name regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project name cannot be empty")]
    EmptyProjectName,

    #[error("project name must be at least 3 characters long")]
    ProjectNameTooShort,

    #[error("project name must be less than 63 characters")]
    ProjectNameTooLong,

    #[error("project name can only contain lowercase letters, numbers, and hyphens")]
    ProjectNameCharacters,

    #[error("project name cannot start or end with a hyphen")]
    ProjectNameHyphen,

    #[error("At least one user group is required")]
    NoUserGroups,

    #[error("Invalid role '{role}' in group {group}. Must be one of: {}", valid_roles())]
    InvalidRole { role: String, group: usize },

    #[error("Invalid email format: '{identifier}' in group {group}. Email addresses must contain @ symbol and be properly formatted (e.g., user@domain.com).")]
    InvalidEmail { identifier: String, group: usize },

    #[error("Invalid user ID: '{identifier}' in group {group} (too short)")]
    UserIdTooShort { identifier: String, group: usize },
}

/// Validate a raw request, stopping at the first problem found
pub fn validate(request: &CreateProjectRequest) -> Result<ValidatedRequest, ValidationError> {
    validate_project_name(&request.app_id)?;

    if request.user_groups.is_empty() {
        return Err(ValidationError::NoUserGroups);
    }

    let groups = request
        .user_groups
        .iter()
        .enumerate()
        .map(|(index, group)| validate_group(index, group))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedRequest {
        project_id: request.app_id.clone(),
        description: request.description.clone(),
        groups,
    })
}

fn validate_group(index: usize, group: &UserGroup) -> Result<ValidatedGroup, ValidationError> {
    let role = Role::parse(&group.role).ok_or_else(|| ValidationError::InvalidRole {
        role: group.role.clone(),
        group: index,
    })?;

    let identifiers = split_identifiers(&group.user_ids)
        .map(|token| classify(token, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedGroup {
        index,
        role,
        identifiers,
    })
}

fn classify(token: &str, group: usize) -> Result<Identifier, ValidationError> {
    if looks_like_email(token) {
        if !validate_email(token) {
            return Err(ValidationError::InvalidEmail {
                identifier: token.to_string(),
                group,
            });
        }
        return Ok(Identifier::Email(token.to_string()));
    }

    if token.len() < MIN_USER_ID_LEN {
        return Err(ValidationError::UserIdTooShort {
            identifier: token.to_string(),
            group,
        });
    }
    Ok(Identifier::UserId(token.to_string()))
}

/// Project names are lowercase DNS-style labels of 3 to 63 characters
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    if name.len() < MIN_PROJECT_NAME_LEN {
        return Err(ValidationError::ProjectNameTooShort);
    }
    if name.len() > MAX_PROJECT_NAME_LEN {
        return Err(ValidationError::ProjectNameTooLong);
    }
    if !PROJECT_NAME_RE.is_match(name) {
        return Err(ValidationError::ProjectNameCharacters);
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(ValidationError::ProjectNameHyphen);
    }
    Ok(())
}

/// Split a comma-separated identifier list, dropping blank entries
pub fn split_identifiers(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// True when the token was meant to be an email, even a malformed one
pub fn looks_like_email(token: &str) -> bool {
    token.contains('@') || EMAIL_DOMAIN_HINTS.iter().any(|hint| token.contains(hint))
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Comma-separated list of role names for error messages
pub fn valid_roles() -> String {
    Role::ALL
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(app_id: &str, groups: &[(&str, &str)]) -> CreateProjectRequest {
        CreateProjectRequest {
            app_id: app_id.to_string(),
            description: String::new(),
            user_groups: groups
                .iter()
                .map(|(ids, role)| UserGroup {
                    user_ids: ids.to_string(),
                    role: role.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn project_name_rules() {
        assert_eq!(validate_project_name("valid-project"), Ok(()));
        assert_eq!(validate_project_name("project123"), Ok(()));
        assert_eq!(validate_project_name("my-project-name"), Ok(()));
        assert_eq!(validate_project_name(&"a".repeat(63)), Ok(()));

        assert_eq!(validate_project_name(""), Err(ValidationError::EmptyProjectName));
        assert_eq!(validate_project_name("ab"), Err(ValidationError::ProjectNameTooShort));
        assert_eq!(
            validate_project_name(&"a".repeat(64)),
            Err(ValidationError::ProjectNameTooLong)
        );
        assert_eq!(
            validate_project_name("Invalid-Project"),
            Err(ValidationError::ProjectNameCharacters)
        );
        assert_eq!(
            validate_project_name("project@name"),
            Err(ValidationError::ProjectNameCharacters)
        );
        assert_eq!(validate_project_name("-project"), Err(ValidationError::ProjectNameHyphen));
        assert_eq!(validate_project_name("project-"), Err(ValidationError::ProjectNameHyphen));
    }

    #[test]
    fn project_name_messages() {
        assert_eq!(
            ValidationError::ProjectNameTooShort.to_string(),
            "project name must be at least 3 characters long"
        );
        assert_eq!(
            ValidationError::ProjectNameHyphen.to_string(),
            "project name cannot start or end with a hyphen"
        );
    }

    #[test]
    fn email_intent_classification() {
        for token in ["user@example.com", "test.com", "user@test.org", "user@test.io", "user@test.dev", "bob.co.uk", "ops.gov"] {
            assert!(looks_like_email(token), "{token} should look like an email");
        }
        for token in ["username", "123", "", "00u2abc"] {
            assert!(!looks_like_email(token), "{token} should not look like an email");
        }
    }

    #[test]
    fn email_format() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user@domain.org"));
        assert!(validate_email("user+tag@example.co.uk"));

        assert!(!validate_email("invalid-email"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email(""));
        assert!(!validate_email("user@.com"));
    }

    #[test]
    fn split_drops_blank_tokens() {
        let tokens: Vec<_> = split_identifiers(" alice@example.com, ,bob , ,").collect();
        assert_eq!(tokens, vec!["alice@example.com", "bob"]);
        assert_eq!(split_identifiers("").count(), 0);
    }

    #[test]
    fn valid_roles_lists_all_three() {
        let roles = valid_roles();
        for role in ["project-owner", "project-viewer", "project-editor"] {
            assert!(roles.contains(role), "missing {role}");
        }
    }

    #[test]
    fn validates_full_request() {
        let validated = validate(&request(
            "checkout",
            &[
                ("alice@example.com, 00u2abc", "project-owner"),
                ("bob@example.org", "project-viewer"),
            ],
        ))
        .unwrap();

        assert_eq!(validated.project_id, "checkout");
        assert_eq!(validated.groups.len(), 2);
        assert_eq!(validated.groups[0].role, Role::ProjectOwner);
        assert_eq!(
            validated.groups[0].identifiers,
            vec![
                Identifier::Email("alice@example.com".to_string()),
                Identifier::UserId("00u2abc".to_string()),
            ]
        );
        assert_eq!(validated.groups[1].index, 1);
        assert_eq!(validated.identifier_count(), 3);
    }

    #[test]
    fn rejects_missing_groups() {
        assert_eq!(
            validate(&request("valid-project", &[])),
            Err(ValidationError::NoUserGroups)
        );
    }

    #[test]
    fn project_name_checked_before_groups() {
        assert_eq!(validate(&request("", &[])), Err(ValidationError::EmptyProjectName));
    }

    #[test]
    fn invalid_role_names_group_and_valid_roles() {
        let err = validate(&request(
            "valid-project",
            &[("alice@example.com", "project-owner"), ("bob@example.com", "invalid-role")],
        ))
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidRole {
                role: "invalid-role".to_string(),
                group: 1
            }
        );
        let message = err.to_string();
        assert!(message.contains("group 1"));
        assert!(message.contains("project-owner, project-viewer, project-editor"));
    }

    #[test]
    fn role_comparison_is_case_sensitive() {
        let err = validate(&request("valid-project", &[("alice@example.com", "Project-Owner")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRole { group: 0, .. }));
    }

    #[test]
    fn malformed_email_intent_is_rejected() {
        let err = validate(&request("valid-project", &[("invalid-email@", "project-owner")])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEmail {
                identifier: "invalid-email@".to_string(),
                group: 0
            }
        );

        // No `@` but an obvious domain: still treated as a broken email
        let err = validate(&request("valid-project", &[("alice.example.com", "project-owner")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail { .. }));
        assert!(err.to_string().contains("user@domain.com"));
    }

    #[test]
    fn short_user_id_is_rejected() {
        let err = validate(&request(
            "valid-project",
            &[("alice@example.com", "project-owner"), ("ok-id, x", "project-editor")],
        ))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid user ID: 'x' in group 1 (too short)");
    }

    #[test]
    fn role_checked_before_identifiers_in_same_group() {
        let err = validate(&request("valid-project", &[("x", "nope")])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRole { .. }));
    }

    #[test]
    fn group_with_only_blank_identifiers_is_allowed() {
        let validated = validate(&request("valid-project", &[(" , ", "project-viewer")])).unwrap();
        assert!(validated.groups[0].identifiers.is_empty());
    }
}
