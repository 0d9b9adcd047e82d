//! File-system access: source enumeration and reading.

pub mod walker;

pub use walker::{collect_source_files, collect_with_ignores, read_source};
