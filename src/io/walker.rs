//! Source-file enumeration policy.

use crate::core::errors::Result;
use crate::core::Language;
use anyhow::Context;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Directory names never descended into.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".tox",
    "venv",
    ".venv",
    "__pycache__",
    ".cache",
];

/// File names never analysed.
const EXCLUDED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", ".gitkeep"];

pub struct FileWalker {
    root: PathBuf,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: Vec::new(),
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Walk the tree and return the supported source files, sorted by path
    /// so downstream builds are reproducible.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(false)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                let is_dir = entry
                    .file_type()
                    .map(|t| t.is_dir())
                    .unwrap_or(false);
                !(is_dir && EXCLUDED_DIRS.contains(&name.as_ref()))
            })
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| {
                crate::core::errors::AnalysisError::Internal(format!(
                    "directory walk failed: {e}"
                ))
            })?;
            let path = entry.path();
            if !path.is_file() || !self.should_process(path) {
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        if EXCLUDED_FILES.contains(&name.as_ref()) {
            return false;
        }
        if !Language::from_path(path).is_supported() {
            return false;
        }
        let path_str = path.to_string_lossy();
        for pattern in &self.ignore_patterns {
            if glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
            {
                return false;
            }
        }
        true
    }
}

/// Enumerate the supported source files under a root, sorted.
pub fn collect_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf()).walk()
}

/// As [`collect_source_files`], with user-supplied glob excludes.
pub fn collect_with_ignores(root: &Path, patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_ignore_patterns(patterns)
        .walk()
}

/// Read one file, mapping failures with the path for context.
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, relative: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export const x = 1;\n").unwrap();
    }

    #[test]
    fn test_only_supported_extensions() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/app.ts");
        touch(&dir, "src/lib.js");
        touch(&dir, "src/readme.md");
        touch(&dir, "src/script.py");

        let files = collect_source_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["app.ts", "lib.js"]);
    }

    #[test]
    fn test_excluded_directories_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/app.ts");
        touch(&dir, "node_modules/pkg/index.js");
        touch(&dir, "dist/bundle.js");
        touch(&dir, "coverage/report.js");

        let files = collect_source_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.ts"));
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "app.ts");
        touch(&dir, ".hidden/secret.ts");

        let files = collect_source_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_sorted_output() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "zeta.ts");
        touch(&dir, "alpha.ts");
        touch(&dir, "mid.ts");

        let files = collect_source_files(dir.path()).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_user_ignore_patterns() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/app.ts");
        touch(&dir, "src/app.test.ts");

        let files =
            collect_with_ignores(dir.path(), vec!["**/*.test.ts".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.ts"));
    }
}
