//! Shared fixtures for integration tests.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Materialise a throwaway project from `(relative path, contents)` pairs.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    for (name, content) in files {
        write_file(dir.path(), name, content);
    }
    dir
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dirs");
    }
    fs::write(path, content).expect("failed to write fixture");
}
