//! Composer strategies and their registry
//!
//! A composer is a strategy that decides whether it applies to a job (a pure
//! file-existence check) and, if chosen, drives the job to a terminal
//! progress state. The registry holds the strategies in a fixed order;
//! resolution takes the first one whose capability check passes.

mod dual;
mod paragraph;
mod single;

pub use dual::DualLanguageComposer;
pub use paragraph::ParagraphComposer;
pub use single::SingleLanguageComposer;

use crate::error::ComposeError;
use crate::lane::Lane;
use crate::progress::{Progress, Status};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Everything a composer needs to know about one job.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Opaque job identifier, equal to the directory name
    pub book_id: String,

    /// The job's directory under the storage root
    pub dir: PathBuf,

    /// The lane this job is being processed in
    pub lane: Lane,
}

impl JobContext {
    pub fn new(storage_root: &Path, book_id: &str, lane: Lane) -> Self {
        Self {
            book_id: book_id.to_string(),
            dir: storage_root.join(book_id),
            lane,
        }
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.path(self.lane.progress_filename)
    }

    pub fn translated_path(&self) -> PathBuf {
        self.path(self.lane.translated_filename)
    }

    pub fn output_path(&self) -> PathBuf {
        self.path(self.lane.final_epub_filename)
    }
}

/// Outcome of a compose run. By the time one of these is returned the
/// progress record already holds the matching terminal state; no failure
/// propagates out of `compose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeOutcome {
    Completed,
    Failed,
    NotImplemented,
}

impl ComposeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ComposeOutcome::Completed)
    }
}

#[async_trait]
pub trait Composer: Send + Sync {
    /// Strategy name, recorded in the progress record.
    fn name(&self) -> &'static str;

    /// Pure capability check over the job directory: file existence only,
    /// no content parsing, no state mutation.
    fn can_compose(&self, job: &JobContext) -> bool;

    /// Drive the job to a terminal state. Writes `processing` before any
    /// heavy work and exactly one terminal status before returning.
    async fn compose(&self, job: &JobContext) -> ComposeOutcome;
}

/// Persist an `error` terminal state after a failed compose run. A failure
/// to write the record itself can only be logged.
pub(crate) async fn record_error(progress: &mut Progress, path: &Path, err: &ComposeError) {
    progress.status = Status::Error;
    progress.error = Some(err.to_string());
    progress.error_at = Some(Utc::now());
    if let Err(save_err) = progress.save(path).await {
        tracing::error!(book_id = %progress.book_id, error = %save_err,
            "failed to record error state");
    }
}

/// Ordered set of composer strategies. Registration order is resolution
/// priority: two composers whose capability checks both match a job will
/// silently prefer the earlier-registered one.
pub struct ComposerRegistry {
    composers: Vec<Box<dyn Composer>>,
}

impl ComposerRegistry {
    pub fn new() -> Self {
        Self {
            composers: Vec::new(),
        }
    }

    /// The default registration order, most specific capability first:
    /// `paragraph_by_paragraph` (needs the alignment JSON files), then
    /// `dual_language_markdown` (needs both manuscripts), then
    /// `simple_markdown` (needs only the translated manuscript).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ParagraphComposer::new()));
        registry.register(Box::new(DualLanguageComposer::new()));
        registry.register(Box::new(SingleLanguageComposer::new()));
        registry
    }

    pub fn register(&mut self, composer: Box<dyn Composer>) {
        tracing::debug!(composer = composer.name(), "registered composer");
        self.composers.push(composer);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.composers.iter().map(|c| c.name()).collect()
    }

    /// The first registered composer that accepts the job. `None` means the
    /// job is not ready yet, not that resolution failed.
    pub fn resolve(&self, job: &JobContext) -> Option<&dyn Composer> {
        self.composers
            .iter()
            .map(|c| c.as_ref())
            .find(|c| c.can_compose(job))
    }
}

impl Default for ComposerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
