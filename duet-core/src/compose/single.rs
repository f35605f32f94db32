//! Single-language composer: renders the translated manuscript to EPUB

use crate::compose::{record_error, ComposeOutcome, Composer, JobContext};
use crate::epub::{package_epub, BookMeta};
use crate::error::{ComposeError, Result};
use crate::progress::{Progress, Status};
use async_trait::async_trait;
use chrono::Utc;

/// Converts the lane's translated manuscript straight to an EPUB, with no
/// merging involved.
pub struct SingleLanguageComposer;

impl SingleLanguageComposer {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, job: &JobContext, progress: &mut Progress) -> Result<()> {
        let translated_path = job.translated_path();

        progress.status = Status::Processing;
        progress.started_at = Some(Utc::now());
        progress.step = Some("converting_to_epub".to_string());
        progress.save(&job.progress_path()).await?;

        let markdown = tokio::fs::read_to_string(&translated_path)
            .await
            .map_err(|_| ComposeError::MissingInput(translated_path.display().to_string()))?;

        let meta = BookMeta {
            fallback_title: format!("Translated Book - {}", job.book_id),
            author: "Translation Service".to_string(),
            language: "en".to_string(),
        };
        let output = job.output_path();
        package_epub(&markdown, &job.dir, &meta, &output).await?;

        progress.status = job.lane.completed_status();
        // The free lane's durable marker is only ever set; the standard lane
        // must not disturb it.
        if job.lane.free {
            progress.free_completed = true;
        }
        progress.completed_at = Some(Utc::now());
        progress.output_file = Some(output.display().to_string());
        progress.step = Some("completed".to_string());
        progress.save(&job.progress_path()).await?;

        tracing::info!(book_id = %job.book_id, output = %output.display(), "created EPUB");
        Ok(())
    }
}

impl Default for SingleLanguageComposer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Composer for SingleLanguageComposer {
    fn name(&self) -> &'static str {
        "simple_markdown"
    }

    fn can_compose(&self, job: &JobContext) -> bool {
        job.translated_path().exists()
    }

    async fn compose(&self, job: &JobContext) -> ComposeOutcome {
        tracing::info!(book_id = %job.book_id, lane = job.lane.name, "starting composition");

        let progress_path = job.progress_path();
        let mut progress = Progress::load(&progress_path, &job.book_id).await;
        progress.composer = self.name().to_string();

        match self.run(job, &mut progress).await {
            Ok(()) => ComposeOutcome::Completed,
            Err(e) => {
                tracing::error!(book_id = %job.book_id, error = %e, "composition failed");
                record_error(&mut progress, &progress_path, &e).await;
                ComposeOutcome::Failed
            }
        }
    }
}
