//! Duet Core Library
//!
//! This crate provides the composition pipeline for the Duet dual-language
//! EPUB service: clients drop markdown manuscripts into per-job directories
//! under a storage root, and a polling worker discovers ready jobs, picks a
//! capable composer strategy, optionally merges an original-language and a
//! translated document into one interleaved manuscript, and packages the
//! result as an EPUB alongside a persisted progress record.

pub mod compose;
pub mod config;
pub mod epub;
pub mod error;
pub mod events;
pub mod lane;
pub mod merge;
pub mod progress;
pub mod render;
pub mod worker;

pub use compose::{ComposeOutcome, Composer, ComposerRegistry, JobContext};
pub use config::Config;
pub use error::{ComposeError, Result};
pub use lane::Lane;
pub use merge::MergeStrategy;
pub use progress::{Progress, Status};
pub use worker::Worker;
