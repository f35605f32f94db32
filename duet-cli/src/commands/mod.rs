//! CLI command implementations

mod compose;
mod merge;
mod status;

pub use compose::compose;
pub use merge::merge;
pub use status::status;
