//! Dual-language composer: merges both manuscripts before packaging

use crate::compose::{record_error, ComposeOutcome, Composer, JobContext};
use crate::epub::{package_epub, BookMeta};
use crate::error::{ComposeError, Result};
use crate::lane::{COMBINED_FILENAME, ORIGINAL_BOOK_FILENAME, ORIGINAL_LEGACY_FILENAME};
use crate::merge::{merge_documents, MergeStrategy};
use crate::progress::{Progress, Status};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

/// Merges the original and translated manuscripts into one dual-language
/// document, keeps the merged markdown as an audit artifact, then packages
/// it as an EPUB.
pub struct DualLanguageComposer {
    strategy: MergeStrategy,
}

impl DualLanguageComposer {
    pub fn new() -> Self {
        Self {
            strategy: MergeStrategy::TitleMatched,
        }
    }

    /// Use the position-matched pairing instead of title matching. Intended
    /// for books whose section titles never align lexically.
    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// `originalbook.md` is what the upload surface writes today;
    /// `original.md` is the older convention still found on disk.
    fn original_path(job: &JobContext) -> Option<PathBuf> {
        [ORIGINAL_BOOK_FILENAME, ORIGINAL_LEGACY_FILENAME]
            .iter()
            .map(|name| job.path(name))
            .find(|path| path.exists())
    }

    async fn run(&self, job: &JobContext, progress: &mut Progress) -> Result<()> {
        let original_path = Self::original_path(job)
            .ok_or_else(|| ComposeError::MissingInput(ORIGINAL_BOOK_FILENAME.to_string()))?;
        let translated_path = job.translated_path();

        progress.status = Status::Processing;
        progress.started_at = Some(Utc::now());
        progress.step = Some("combining_content".to_string());
        progress.save(&job.progress_path()).await?;

        let original = tokio::fs::read_to_string(&original_path).await.map_err(|e| {
            ComposeError::Merge(format!("cannot read {}: {e}", original_path.display()))
        })?;
        let translated = tokio::fs::read_to_string(&translated_path).await.map_err(|e| {
            ComposeError::Merge(format!("cannot read {}: {e}", translated_path.display()))
        })?;

        let combined = merge_documents(&original, &translated, self.strategy);
        let combined_path = job.path(COMBINED_FILENAME);
        tokio::fs::write(&combined_path, &combined).await?;
        tracing::info!(book_id = %job.book_id, combined = %combined_path.display(),
            "combined original and translated content");

        progress.step = Some("converting_to_epub".to_string());
        progress.save(&job.progress_path()).await?;

        let meta = BookMeta {
            fallback_title: format!("Dual Language Book - {}", job.book_id),
            author: "Dual Language Translation Service".to_string(),
            language: "en".to_string(),
        };
        let output = job.output_path();
        package_epub(&combined, &job.dir, &meta, &output).await?;

        progress.status = job.lane.completed_status();
        // The free lane's durable marker is only ever set; the standard lane
        // must not disturb it.
        if job.lane.free {
            progress.free_completed = true;
        }
        progress.completed_at = Some(Utc::now());
        progress.output_file = Some(output.display().to_string());
        progress.combined_file = Some(combined_path.display().to_string());
        progress.step = Some("completed".to_string());
        progress.save(&job.progress_path()).await?;

        tracing::info!(book_id = %job.book_id, output = %output.display(),
            "created dual-language EPUB");
        Ok(())
    }
}

impl Default for DualLanguageComposer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Composer for DualLanguageComposer {
    fn name(&self) -> &'static str {
        "dual_language_markdown"
    }

    fn can_compose(&self, job: &JobContext) -> bool {
        Self::original_path(job).is_some() && job.translated_path().exists()
    }

    async fn compose(&self, job: &JobContext) -> ComposeOutcome {
        tracing::info!(book_id = %job.book_id, lane = job.lane.name,
            "starting dual-language composition");

        let progress_path = job.progress_path();
        let mut progress = Progress::load(&progress_path, &job.book_id).await;
        progress.composer = self.name().to_string();

        match self.run(job, &mut progress).await {
            Ok(()) => ComposeOutcome::Completed,
            Err(e) => {
                tracing::error!(book_id = %job.book_id, error = %e,
                    "dual-language composition failed");
                record_error(&mut progress, &progress_path, &e).await;
                ComposeOutcome::Failed
            }
        }
    }
}
