//! The polling job worker
//!
//! One worker scans the storage root for job directories and drives every
//! ready job through the composer registry, lane by lane. Processing is
//! sequential within a cycle: one job is fully composed before the next is
//! considered, so each job's progress record only ever has one writer.

use crate::compose::{ComposeOutcome, ComposerRegistry, JobContext};
use crate::config::Config;
use crate::events::{EventKind, EventSink};
use crate::lane::{Lane, DUAL_FINAL_EPUB_FILENAME};
use crate::progress::Progress;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct Worker {
    storage_root: PathBuf,
    sleep_interval: Duration,
    lanes: Vec<Lane>,
    registry: ComposerRegistry,
    events: Arc<dyn EventSink>,
}

impl Worker {
    pub fn new(config: &Config, registry: ComposerRegistry, events: Arc<dyn EventSink>) -> Self {
        Self {
            storage_root: config.storage_root.clone(),
            sleep_interval: config.sleep_interval,
            lanes: vec![Lane::standard(), Lane::free()],
            registry,
            events,
        }
    }

    /// Job directories under the storage root that are ready for this lane.
    /// A transient listing failure yields an empty batch; the next cycle
    /// retries.
    pub async fn find_jobs(&self, lane: &Lane) -> Vec<JobContext> {
        let mut jobs = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.storage_root).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(root = %self.storage_root.display(), error = %e,
                    "cannot list storage root");
                return jobs;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let is_dir = entry
                        .file_type()
                        .await
                        .map(|t| t.is_dir())
                        .unwrap_or(false);
                    if !is_dir {
                        continue;
                    }
                    let Some(book_id) = entry.file_name().to_str().map(String::from) else {
                        continue;
                    };

                    let job = JobContext::new(&self.storage_root, &book_id, lane.clone());
                    if self.needs_composition(&job).await {
                        tracing::info!(book_id = %book_id, lane = lane.name,
                            "found composition job");
                        jobs.push(job);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "error scanning storage root");
                    break;
                }
            }
        }

        jobs
    }

    /// Readiness predicate: output absent, input present, progress not
    /// already terminal for the lane, and some registered composer accepts
    /// the job.
    async fn needs_composition(&self, job: &JobContext) -> bool {
        if job.output_path().exists() {
            return false;
        }
        if !job.lane.free && job.path(DUAL_FINAL_EPUB_FILENAME).exists() {
            return false;
        }
        if !job.translated_path().exists() {
            return false;
        }

        let progress = Progress::load(&job.progress_path(), &job.book_id).await;
        if job.lane.is_terminal(&progress) {
            return false;
        }

        self.registry.resolve(job).is_some()
    }

    /// Compose one job. Composers record their own failures, so the outcome
    /// is always a plain value; nothing here can abort the scan.
    pub async fn process_job(&self, job: &JobContext) -> ComposeOutcome {
        let Some(composer) = self.registry.resolve(job) else {
            // The job was ready moments ago; its inputs must have changed.
            tracing::error!(book_id = %job.book_id, "no suitable composer found");
            return ComposeOutcome::Failed;
        };

        tracing::info!(book_id = %job.book_id, composer = composer.name(),
            lane = job.lane.name, "processing job");
        composer.compose(job).await
    }

    /// One poll cycle over every lane. Returns the number of jobs processed.
    pub async fn poll_once(&self) -> usize {
        let mut processed = 0;

        for lane in &self.lanes {
            for job in self.find_jobs(lane).await {
                processed += 1;
                self.events
                    .emit(EventKind::ServiceStart, &job.book_id, lane.name, None, None)
                    .await;

                let outcome = self.process_job(&job).await;
                let result = if outcome.is_success() {
                    "success"
                } else {
                    "error"
                };
                self.events
                    .emit(
                        EventKind::ServiceStop,
                        &job.book_id,
                        lane.name,
                        Some(result),
                        None,
                    )
                    .await;
            }
        }

        processed
    }

    /// Poll indefinitely, sleeping a fixed interval between cycles. Ctrl-C
    /// lands between jobs, so shutdown never corrupts a progress record.
    pub async fn run(&self) {
        tracing::info!(root = %self.storage_root.display(),
            composers = ?self.registry.names(), "worker started");

        loop {
            let processed = self.poll_once().await;
            if processed == 0 {
                tracing::debug!("no jobs found, sleeping");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.sleep_interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupt received, shutting down");
                    break;
                }
            }
        }
    }
}
