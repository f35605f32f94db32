//! Paragraph-by-paragraph composer, a declared but unimplemented strategy

use crate::compose::{record_error, ComposeOutcome, Composer, JobContext};
use crate::lane::{CONTENT_BREAKDOWN_FILENAME, ORIGINAL_BOOK_FILENAME, TRANSLATED_JSON_FILENAME};
use crate::progress::{Progress, Status};
use async_trait::async_trait;
use chrono::Utc;

/// Placeholder strategy for jobs that ship a translation mapping and content
/// breakdown alongside both manuscripts. It claims those jobs so they end in
/// `not_implemented` rather than being mangled by a composer that ignores
/// the alignment data.
pub struct ParagraphComposer;

impl ParagraphComposer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParagraphComposer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Composer for ParagraphComposer {
    fn name(&self) -> &'static str {
        "paragraph_by_paragraph"
    }

    fn can_compose(&self, job: &JobContext) -> bool {
        job.translated_path().exists()
            && [
                ORIGINAL_BOOK_FILENAME,
                TRANSLATED_JSON_FILENAME,
                CONTENT_BREAKDOWN_FILENAME,
            ]
            .iter()
            .all(|name| job.path(name).exists())
    }

    async fn compose(&self, job: &JobContext) -> ComposeOutcome {
        tracing::info!(book_id = %job.book_id, "starting paragraph-by-paragraph composition");

        let progress_path = job.progress_path();
        let mut progress = Progress::load(&progress_path, &job.book_id).await;
        progress.composer = self.name().to_string();
        progress.status = Status::Processing;
        progress.started_at = Some(Utc::now());
        if let Err(e) = progress.save(&progress_path).await {
            record_error(&mut progress, &progress_path, &e).await;
            return ComposeOutcome::Failed;
        }

        tracing::warn!(book_id = %job.book_id, "paragraph-by-paragraph composer not yet implemented");

        progress.status = Status::NotImplemented;
        progress.completed_at = Some(Utc::now());
        progress.message = Some("Paragraph-by-paragraph composer not yet implemented".to_string());
        if let Err(e) = progress.save(&progress_path).await {
            record_error(&mut progress, &progress_path, &e).await;
            return ComposeOutcome::Failed;
        }

        ComposeOutcome::NotImplemented
    }
}
