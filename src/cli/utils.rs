use anyhow::Context;
use serde_json::{json, Value};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::project::{validate, CreateProjectRequest, ValidatedRequest, ValidationError};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Read a request file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON
pub fn load_request(path: &Path) -> anyhow::Result<CreateProjectRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_request(path, &content)
}

pub fn parse_request(path: &Path, content: &str) -> anyhow::Result<CreateProjectRequest> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(content).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(content).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Validate a loaded request, reporting a failure before returning it
pub fn validate_or_report(
    file: &Path,
    request: &CreateProjectRequest,
    output_format: &OutputFormat,
) -> anyhow::Result<ValidatedRequest> {
    match validate(request) {
        Ok(validated) => Ok(validated),
        Err(err) => {
            let err = anyhow::Error::new(err)
                .context(format!("request in {} is invalid", file.display()));
            output_error(output_format, &err.root_cause().to_string(), error_code(&err))?;
            Err(err)
        }
    }
}

/// Machine-readable code for a failed command, when one applies
pub fn error_code(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<ValidationError>().map(|_| VALIDATION_ERROR)
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&error_envelope(message, error_code))?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

pub fn error_envelope(message: &str, error_code: Option<&str>) -> Value {
    let mut response = json!({
        "success": false,
        "message": message
    });
    if let Some(code) = error_code {
        response["code"] = json!(code);
    }
    response
}

/// Join a server base URL and an API path
pub fn endpoint(server: &str, path: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), path)
}
