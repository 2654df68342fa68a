use serde_json::{json, Value};
use std::path::Path;

use crate::cli::utils::{load_request, output_success, validate_or_report};
use crate::cli::OutputFormat;
use crate::project::ValidatedRequest;

pub fn handle(file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let request = load_request(file)?;
    let validated = validate_or_report(file, &request, &output_format)?;

    if let OutputFormat::Text = output_format {
        for group in &validated.groups {
            let identifiers: Vec<_> = group.identifiers.iter().map(|i| i.as_str()).collect();
            println!("  group {} ({}): {}", group.index, group.role, identifiers.join(", "));
        }
    }

    let (message, data) = summary(&validated);
    output_success(&output_format, &message, Some(data))
}

pub fn summary(validated: &ValidatedRequest) -> (String, Value) {
    let groups: Vec<_> = validated
        .groups
        .iter()
        .map(|group| {
            json!({
                "group": group.index,
                "role": group.role,
                "identifiers": group.identifiers.iter().map(|i| i.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let message = format!(
        "Request for project '{}' is valid ({} groups, {} user identifiers)",
        validated.project_id,
        validated.groups.len(),
        validated.identifier_count()
    );

    (message, json!({ "project": validated.project_id, "groups": groups }))
}
