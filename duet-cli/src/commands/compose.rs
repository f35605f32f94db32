//! Compose command implementation

use anyhow::{bail, Context, Result};
use duet_core::compose::{ComposeOutcome, ComposerRegistry, JobContext};
use duet_core::Lane;
use std::path::Path;

/// Compose a single job directory once
pub async fn compose(job_dir: &str, lane_name: &str) -> Result<()> {
    let dir = Path::new(job_dir)
        .canonicalize()
        .with_context(|| format!("Job directory not found: {}", job_dir))?;
    let storage_root = dir
        .parent()
        .context("Job directory has no parent directory")?;
    let book_id = dir
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid job directory name")?;

    let lane = match lane_name {
        "standard" => Lane::standard(),
        "free" => Lane::free(),
        other => bail!("Unknown lane '{}', expected 'standard' or 'free'", other),
    };

    let job = JobContext::new(storage_root, book_id, lane);
    let registry = ComposerRegistry::with_defaults();
    let Some(composer) = registry.resolve(&job) else {
        bail!("No composer accepts this job; are the input files in place?");
    };

    println!("Composing '{}' with {}", book_id, composer.name());
    match composer.compose(&job).await {
        ComposeOutcome::Completed => {
            println!("Completed: {}", job.output_path().display());
            Ok(())
        }
        ComposeOutcome::Failed => {
            bail!("Composition failed; see the progress record for details")
        }
        ComposeOutcome::NotImplemented => {
            bail!("The selected composer is a placeholder and performed no work")
        }
    }
}
