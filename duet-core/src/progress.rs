//! The persisted per-job progress record

use crate::error::{ComposeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Job lifecycle status.
///
/// `pending → processing → {completed | free-completed | error}`, with
/// `not_implemented` as the terminal state of a placeholder strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Processing,
    Completed,
    #[serde(rename = "free-completed")]
    FreeCompleted,
    Error,
    NotImplemented,
}

/// Progress record for one job, stored as UTF-8 JSON inside the job
/// directory and rewritten on every state transition.
///
/// Owned by the composer currently processing the job; the worker only reads
/// it to decide whether the job is already done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub book_id: String,
    pub composer: String,
    pub status: Status,

    /// Free-form phase label ("combining_content", "converting_to_epub", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_file: Option<String>,

    /// Free-lane completion marker, independent of the standard lane's state
    #[serde(default)]
    pub free_completed: bool,
}

impl Progress {
    /// A fresh pending record for a job no composer has touched yet.
    pub fn pending(book_id: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
            composer: String::new(),
            status: Status::Pending,
            step: None,
            created_at: Some(Utc::now()),
            started_at: None,
            completed_at: None,
            error_at: None,
            error: None,
            message: None,
            output_file: None,
            combined_file: None,
            free_completed: false,
        }
    }

    /// Load the record from disk. A missing or unreadable file synthesizes a
    /// fresh pending record; loading never fails.
    pub async fn load(path: &Path, book_id: &str) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(progress) => progress,
                Err(e) => {
                    tracing::error!(book_id, error = %e, "unreadable progress record, starting fresh");
                    Self::pending(book_id)
                }
            },
            Err(_) => Self::pending(book_id),
        }
    }

    /// Persist the record, creating the job directory if needed.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Progress(e.to_string()))?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }
}
