//! Service configuration, loaded from the environment

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the composing service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding one subdirectory per job
    pub storage_root: PathBuf,

    /// Fixed wait between worker poll cycles
    pub sleep_interval: Duration,
}

impl Config {
    /// Load configuration from `DUET_STORAGE_ROOT` and `DUET_SLEEP_INTERVAL`
    /// (seconds), falling back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let storage_root =
            std::env::var("DUET_STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string());
        let sleep_secs = std::env::var("DUET_SLEEP_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            storage_root: PathBuf::from(storage_root),
            sleep_interval: Duration::from_secs(sleep_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./storage"),
            sleep_interval: Duration::from_secs(10),
        }
    }
}
