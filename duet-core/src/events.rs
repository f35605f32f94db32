//! Lifecycle event sink for job start/stop notifications
//!
//! Events are fire-and-forget: a sink that cannot record an event logs the
//! failure and moves on, it never fails the job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const SERVICE_NAME: &str = "composingservice";

/// Kinds of service lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ServiceStart,
    ServiceStop,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ServiceStart => "service-start",
            EventKind::ServiceStop => "service-stop",
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(
        &self,
        kind: EventKind,
        book_id: &str,
        lane: &str,
        result: Option<&str>,
        error: Option<&str>,
    );
}

#[derive(Serialize)]
struct EventRecord<'a> {
    timestamp: DateTime<Utc>,
    event: &'a str,
    book_id: &'a str,
    service: &'a str,
    lane: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Appends one JSON object per event to `service-events.jsonl` under the
/// storage root.
pub struct JsonlEventSink {
    path: PathBuf,
}

impl JsonlEventSink {
    pub fn new(storage_root: &Path) -> Self {
        Self {
            path: storage_root.join("service-events.jsonl"),
        }
    }
}

#[async_trait]
impl EventSink for JsonlEventSink {
    async fn emit(
        &self,
        kind: EventKind,
        book_id: &str,
        lane: &str,
        result: Option<&str>,
        error: Option<&str>,
    ) {
        let record = EventRecord {
            timestamp: Utc::now(),
            event: kind.as_str(),
            book_id,
            service: SERVICE_NAME,
            lane,
            result,
            error,
        };
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize service event");
                return;
            }
        };

        let write = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            Ok::<_, std::io::Error>(())
        };
        if let Err(e) = write.await {
            tracing::error!(error = %e, "failed to write service event");
        }
    }
}

/// Discards every event. Useful for tests and one-shot CLI runs.
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn emit(
        &self,
        _kind: EventKind,
        _book_id: &str,
        _lane: &str,
        _result: Option<&str>,
        _error: Option<&str>,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_jsonl_sink_appends_events() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlEventSink::new(dir.path());

        sink.emit(EventKind::ServiceStart, "book-1", "standard", None, None)
            .await;
        sink.emit(
            EventKind::ServiceStop,
            "book-1",
            "standard",
            Some("success"),
            None,
        )
        .await;

        let content = tokio::fs::read_to_string(dir.path().join("service-events.jsonl"))
            .await
            .unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "service-start");
        assert_eq!(first["book_id"], "book-1");
        assert_eq!(first["service"], "composingservice");
        assert!(first.get("result").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["result"], "success");
    }
}
