pub mod document;
pub mod entry;
pub mod gaps;

pub use document::{default_header, ChangelogDocument};
pub use entry::{Category, ChangelogEntry};
pub use gaps::find_missing_versions;
