//! Shared error types for the analysis engine.

use std::path::PathBuf;
use thiserror::Error;

/// Error surface for all analysis operations.
///
/// Errors are values carrying a kind and a readable message; they are
/// returned, not raised for control flow. Per-file errors during a project
/// build are collected and reported alongside the finished graph.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The parser provider could not initialise; fatal to the session.
    #[error("Failed to load parser for {language}: {message}")]
    ParserLoad { language: String, message: String },

    /// The file path does not map to a known source language.
    #[error("Unsupported file: {}", path.display())]
    UnsupportedFile { path: PathBuf },

    /// The source text produced no usable tree.
    #[error("Parse error in {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    /// A CFG/DFG/PDG request named a function that cannot be located.
    #[error("Function '{name}' not found in {}", file.display())]
    FunctionNotFound { name: String, file: PathBuf },

    /// A slice criterion line falls outside the function extent; non-fatal.
    #[error("Slice criterion line {line} is outside function '{function}' (lines {start}-{end})")]
    SliceCriterionOutOfRange {
        function: String,
        line: usize,
        start: usize,
        end: usize,
    },

    /// Invariant violation. Loud in development, an error value in release.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl AnalysisError {
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn function_not_found(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self::FunctionNotFound {
            name: name.into(),
            file: file.into(),
        }
    }

    /// True for errors that invalidate the whole session rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ParserLoad { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A per-file failure recorded during a project build.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileError {
    pub file: PathBuf,
    pub message: String,
}
