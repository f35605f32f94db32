//! Job lanes and the filename conventions that define them
//!
//! Two independent processing tracks share the storage root, distinguished
//! entirely by filenames and progress fields: the standard lane and the free
//! lane. They never interact; each sees its own inputs and outputs inside
//! the same job directories.

use crate::progress::{Progress, Status};

pub const PROGRESS_FILENAME: &str = "composingservice-progress.json";
pub const COMBINED_FILENAME: &str = "combined-dual-language.md";

pub const TRANSLATED_FILENAME: &str = "translatedcontent.md";
pub const FREE_TRANSLATED_FILENAME: &str = "free-translatedcontent.md";

pub const FINAL_EPUB_FILENAME: &str = "final.epub";
pub const FREE_FINAL_EPUB_FILENAME: &str = "free-final.epub";
/// Written by older service versions; still recognized as a terminal artifact.
pub const DUAL_FINAL_EPUB_FILENAME: &str = "dual-language-final.epub";

pub const ORIGINAL_BOOK_FILENAME: &str = "originalbook.md";
/// Older upload convention for the original-language manuscript.
pub const ORIGINAL_LEGACY_FILENAME: &str = "original.md";

pub const TRANSLATED_JSON_FILENAME: &str = "translatedcontent.json";
pub const CONTENT_BREAKDOWN_FILENAME: &str = "contentbreakdown.json";

/// One processing track over the storage root.
#[derive(Debug, Clone)]
pub struct Lane {
    pub name: &'static str,
    pub translated_filename: &'static str,
    pub final_epub_filename: &'static str,
    pub progress_filename: &'static str,
    pub free: bool,
}

impl Lane {
    pub fn standard() -> Self {
        Self {
            name: "standard",
            translated_filename: TRANSLATED_FILENAME,
            final_epub_filename: FINAL_EPUB_FILENAME,
            progress_filename: PROGRESS_FILENAME,
            free: false,
        }
    }

    pub fn free() -> Self {
        Self {
            name: "free",
            translated_filename: FREE_TRANSLATED_FILENAME,
            final_epub_filename: FREE_FINAL_EPUB_FILENAME,
            progress_filename: PROGRESS_FILENAME,
            free: true,
        }
    }

    /// Whether this progress record already counts as finished for the lane.
    /// `error` and `not_implemented` are terminal everywhere; the completion
    /// statuses are lane-specific.
    pub fn is_terminal(&self, progress: &Progress) -> bool {
        if self.free && progress.free_completed {
            return true;
        }
        match progress.status {
            Status::Error | Status::NotImplemented => true,
            Status::Completed => !self.free,
            Status::FreeCompleted => self.free,
            Status::Pending | Status::Processing => false,
        }
    }

    /// The completion status a composer records for this lane.
    pub fn completed_status(&self) -> Status {
        if self.free {
            Status::FreeCompleted
        } else {
            Status::Completed
        }
    }
}
