use once_cell::sync::Lazy;
use regex::Regex;

/// Object names in Nobl9 are capped at 63 characters
pub const MAX_NAME_LEN: usize = 63;
/// Budget for each of the project and user components of a binding name
pub const COMPONENT_LEN: usize = 20;

const ASSIGNMENT_PREFIX: &str = "assign-";

static INVALID_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]+").expect("valid name character regex"));

/// Make a string RFC-1123 friendly: lowercase, every run of other characters
/// collapsed to a single hyphen, no leading or trailing hyphens
pub fn sanitize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    INVALID_NAME_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Cut `value` to at most `max_len` characters
pub fn truncate(value: &str, max_len: usize) -> &str {
    match value.char_indices().nth(max_len) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Deterministic binding name:
/// `assign-<project>-<user>-g<group>[-<ordinal>]-<timestamp>`.
///
/// `ordinal` is zero for the first use of a name within a batch; later
/// collisions get a numeric suffix. The user component gives up characters
/// when the tail grows so the result never exceeds [`MAX_NAME_LEN`].
pub fn assignment_name(
    project_id: &str,
    identifier: &str,
    group_index: usize,
    timestamp: i64,
    ordinal: usize,
) -> String {
    let project = sanitize_name(project_id);
    let project = truncate(&project, COMPONENT_LEN);

    let tail = match ordinal {
        0 => format!("g{group_index}-{timestamp}"),
        n => format!("g{group_index}-{n}-{timestamp}"),
    };

    // two separators around the user component
    let fixed = ASSIGNMENT_PREFIX.len() + project.len() + tail.len() + 2;
    let user_budget = MAX_NAME_LEN.saturating_sub(fixed).min(COMPONENT_LEN);

    let user = sanitize_name(identifier);
    let user = truncate(&user, user_budget);

    format!("{ASSIGNMENT_PREFIX}{project}-{user}-{tail}")
}
