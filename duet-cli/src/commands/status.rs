//! Status command implementation

use anyhow::{Context, Result};
use duet_core::lane::PROGRESS_FILENAME;
use std::path::Path;

/// Print a job's progress record
pub fn status(job_dir: &str) -> Result<()> {
    let path = Path::new(job_dir).join(PROGRESS_FILENAME);

    if !path.exists() {
        println!("pending (no progress record yet)");
        return Ok(());
    }

    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read progress record: {}", path.display()))?;
    let progress: serde_json::Value =
        serde_json::from_str(&data).context("Progress record is not valid JSON")?;

    println!("{}", serde_json::to_string_pretty(&progress)?);
    Ok(())
}
