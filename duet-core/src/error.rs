//! Error types for duet-core

use thiserror::Error;

/// Result type alias using ComposeError
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Errors that can occur while composing a job.
///
/// A missing input file at capability-check time is never an error; the
/// capability predicate simply returns false. `MissingInput` only appears
/// when a file vanished between the capability check and composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Missing input file: {0}")]
    MissingInput(String),

    #[error("Merge failed: {0}")]
    Merge(String),

    #[error("Markdown rendering failed: {0}")]
    Render(String),

    #[error("EPUB packaging failed: {0}")]
    Package(String),

    #[error("Progress record error: {0}")]
    Progress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
