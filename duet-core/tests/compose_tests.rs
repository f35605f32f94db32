//! End-to-end composition tests over real job directories
//!
//! Each test builds a throwaway storage root with tempfile, drops input
//! files the way the upload surface would, and drives jobs through the
//! registry or the worker.

use duet_core::compose::{
    ComposeOutcome, ComposerRegistry, DualLanguageComposer, JobContext, SingleLanguageComposer,
};
use duet_core::events::NullEventSink;
use duet_core::{Composer, Config, Lane, Status, Worker};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const ORIGINAL: &str = "# Test Book: Sample Dual-Language Content\n\nWelcome.\n\n\
## Features\n\nGood stuff.\n\n- fast\n- small\n";
const TRANSLATED: &str = "# Sách kiểm tra: nội dung song ngữ mẫu\n\nChào mừng.\n\n\
## Tính năng\n\nĐồ tốt.\n\n- nhanh\n- nhỏ\n";

fn make_job(storage: &TempDir, book_id: &str, files: &[(&str, &str)]) -> JobContext {
    let dir = storage.path().join(book_id);
    std::fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
    JobContext::new(storage.path(), book_id, Lane::standard())
}

fn worker_for(storage: &TempDir) -> Worker {
    let config = Config {
        storage_root: storage.path().to_path_buf(),
        sleep_interval: Duration::from_millis(10),
    };
    Worker::new(&config, ComposerRegistry::with_defaults(), Arc::new(NullEventSink))
}

async fn load_progress(dir: &Path) -> duet_core::Progress {
    duet_core::Progress::load(&dir.join("composingservice-progress.json"), "ignored").await
}

#[test]
fn single_language_job_capability_checks() {
    let storage = TempDir::new().unwrap();
    let job = make_job(&storage, "job-1", &[("translatedcontent.md", TRANSLATED)]);

    assert!(SingleLanguageComposer::new().can_compose(&job));
    assert!(!DualLanguageComposer::new().can_compose(&job));
}

#[test]
fn registry_resolves_dual_before_single_for_dual_jobs() {
    let storage = TempDir::new().unwrap();
    let job = make_job(
        &storage,
        "job-2",
        &[
            ("translatedcontent.md", TRANSLATED),
            ("originalbook.md", ORIGINAL),
        ],
    );

    let registry = ComposerRegistry::with_defaults();
    let composer = registry.resolve(&job).unwrap();
    assert_eq!(composer.name(), "dual_language_markdown");
}

#[test]
fn legacy_original_filename_is_accepted() {
    let storage = TempDir::new().unwrap();
    let job = make_job(
        &storage,
        "job-3",
        &[
            ("translatedcontent.md", TRANSLATED),
            ("original.md", ORIGINAL),
        ],
    );

    assert!(DualLanguageComposer::new().can_compose(&job));
}

#[test]
fn paragraph_placeholder_claims_jobs_with_alignment_files() {
    let storage = TempDir::new().unwrap();
    let job = make_job(
        &storage,
        "job-4",
        &[
            ("translatedcontent.md", TRANSLATED),
            ("originalbook.md", ORIGINAL),
            ("translatedcontent.json", "{}"),
            ("contentbreakdown.json", "{}"),
        ],
    );

    let registry = ComposerRegistry::with_defaults();
    assert_eq!(registry.resolve(&job).unwrap().name(), "paragraph_by_paragraph");
}

#[tokio::test]
async fn single_language_compose_produces_epub_and_completed_progress() {
    let storage = TempDir::new().unwrap();
    let job = make_job(&storage, "job-5", &[("translatedcontent.md", TRANSLATED)]);

    let outcome = SingleLanguageComposer::new().compose(&job).await;
    assert_eq!(outcome, ComposeOutcome::Completed);
    assert!(job.dir.join("final.epub").exists());

    let progress = load_progress(&job.dir).await;
    assert_eq!(progress.status, Status::Completed);
    assert_eq!(progress.composer, "simple_markdown");
    assert!(progress.output_file.is_some());
    assert!(progress.completed_at.is_some());
}

#[tokio::test]
async fn dual_language_compose_writes_audit_artifact_and_epub() {
    let storage = TempDir::new().unwrap();
    let job = make_job(
        &storage,
        "job-6",
        &[
            ("translatedcontent.md", TRANSLATED),
            ("originalbook.md", ORIGINAL),
        ],
    );

    let outcome = DualLanguageComposer::new().compose(&job).await;
    assert_eq!(outcome, ComposeOutcome::Completed);

    let combined = std::fs::read_to_string(job.dir.join("combined-dual-language.md")).unwrap();
    // The alias table pairs the Features headings across languages.
    assert!(combined.contains("## Features / Tính năng"));
    assert!(combined.contains("- fast / nhanh"));

    assert!(job.dir.join("final.epub").exists());
    let progress = load_progress(&job.dir).await;
    assert_eq!(progress.status, Status::Completed);
    assert!(progress.combined_file.is_some());
}

#[tokio::test]
async fn failed_compose_records_error_and_leaves_no_output() {
    let storage = TempDir::new().unwrap();
    let job = make_job(&storage, "job-7", &[("translatedcontent.md", TRANSLATED)]);
    // An unreadable "original" (a directory) passes the existence check and
    // then fails mid-merge.
    std::fs::create_dir(job.dir.join("originalbook.md")).unwrap();

    let composer = DualLanguageComposer::new();
    assert!(composer.can_compose(&job));

    let outcome = composer.compose(&job).await;
    assert_eq!(outcome, ComposeOutcome::Failed);
    assert!(!job.dir.join("final.epub").exists());

    let progress = load_progress(&job.dir).await;
    assert_eq!(progress.status, Status::Error);
    assert!(progress.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(progress.error_at.is_some());
}

#[tokio::test]
async fn worker_processes_ready_jobs_and_never_reprocesses_completed_ones() {
    let storage = TempDir::new().unwrap();
    make_job(&storage, "job-8", &[("translatedcontent.md", TRANSLATED)]);
    let worker = worker_for(&storage);

    assert_eq!(worker.poll_once().await, 1);
    assert!(storage.path().join("job-8").join("final.epub").exists());

    // Second cycle: job is terminal and the output exists, nothing to do.
    assert_eq!(worker.poll_once().await, 0);
}

#[tokio::test]
async fn worker_skips_jobs_with_terminal_progress_even_without_output() {
    let storage = TempDir::new().unwrap();
    let job = make_job(&storage, "job-9", &[("translatedcontent.md", TRANSLATED)]);

    let mut progress = duet_core::Progress::pending("job-9");
    progress.status = Status::Error;
    progress.save(&job.progress_path()).await.unwrap();

    let worker = worker_for(&storage);
    assert_eq!(worker.poll_once().await, 0);
}

#[tokio::test]
async fn worker_faulty_job_does_not_abort_the_cycle() {
    let storage = TempDir::new().unwrap();
    let bad = make_job(&storage, "job-a", &[("translatedcontent.md", TRANSLATED)]);
    std::fs::create_dir(bad.dir.join("originalbook.md")).unwrap();
    make_job(&storage, "job-b", &[("translatedcontent.md", TRANSLATED)]);

    let worker = worker_for(&storage);
    assert_eq!(worker.poll_once().await, 2);

    assert!(storage.path().join("job-b").join("final.epub").exists());
    let progress = load_progress(&storage.path().join("job-a")).await;
    assert_eq!(progress.status, Status::Error);
}

#[tokio::test]
async fn free_lane_uses_its_own_filenames_and_completion_flag() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().join("job-f");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("free-translatedcontent.md"), TRANSLATED).unwrap();

    let worker = worker_for(&storage);
    assert_eq!(worker.poll_once().await, 1);

    assert!(dir.join("free-final.epub").exists());
    assert!(!dir.join("final.epub").exists());

    let progress = load_progress(&dir).await;
    assert_eq!(progress.status, Status::FreeCompleted);
    assert!(progress.free_completed);

    // The free lane is now terminal; the standard lane still sees no input.
    assert_eq!(worker.poll_once().await, 0);
}

#[tokio::test]
async fn free_completion_marker_survives_a_later_standard_compose() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().join("job-h");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("free-translatedcontent.md"), TRANSLATED).unwrap();

    let worker = worker_for(&storage);
    assert_eq!(worker.poll_once().await, 1);
    assert!(load_progress(&dir).await.free_completed);

    // Standard-lane input arrives later in the same directory.
    std::fs::write(dir.join("translatedcontent.md"), TRANSLATED).unwrap();
    assert_eq!(worker.poll_once().await, 1);

    let progress = load_progress(&dir).await;
    assert_eq!(progress.status, Status::Completed);
    assert!(progress.free_completed);

    // With the marker intact the free lane stays terminal even after its
    // output is removed.
    std::fs::remove_file(dir.join("free-final.epub")).unwrap();
    assert_eq!(worker.poll_once().await, 0);
}

#[tokio::test]
async fn standard_and_free_lanes_are_independent_in_one_directory() {
    let storage = TempDir::new().unwrap();
    let dir = storage.path().join("job-g");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("translatedcontent.md"), TRANSLATED).unwrap();
    std::fs::write(dir.join("free-translatedcontent.md"), TRANSLATED).unwrap();

    let worker = worker_for(&storage);
    assert_eq!(worker.poll_once().await, 2);

    assert!(dir.join("final.epub").exists());
    assert!(dir.join("free-final.epub").exists());
    assert_eq!(worker.poll_once().await, 0);
}
