use std::path::Path;

use crate::cli::utils::{load_request, output_success, validate_or_report};
use crate::cli::OutputFormat;
use crate::project::memory::{MemoryDirectory, RecordingApplier};
use crate::project::{Reconciled, ReconcileError, Reconciler, SystemClock, ValidatedRequest};

pub async fn handle(file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let request = load_request(file)?;
    let validated = validate_or_report(file, &request, &output_format)?;

    let plan = dry_run(&validated).await?;
    let objects = plan.objects();

    let message = format!(
        "Would apply {} objects (1 project + {} role bindings)",
        objects.len(),
        plan.assignment_count()
    );

    match output_format {
        OutputFormat::Json => {
            let manifest = serde_json::to_value(&objects)?;
            output_success(&output_format, &message, Some(manifest))
        }
        OutputFormat::Text => {
            for object in &objects {
                println!("  {} {}", object.kind(), object.name());
            }
            output_success(&output_format, &message, None)
        }
    }
}

/// Emails resolve to themselves and nothing leaves the process
pub async fn dry_run(validated: &ValidatedRequest) -> Result<Reconciled, ReconcileError> {
    let directory = MemoryDirectory::echo();
    let applier = RecordingApplier::new();
    Reconciler::new(&directory, &applier, &SystemClock).plan(validated).await
}
