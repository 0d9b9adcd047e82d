pub mod errors;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source languages the engine can parse.
///
/// This table is the single source of truth for supported extensions;
/// languages without a wired grammar must not appear here.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    JavaScript,
    TypeScript,
    Tsx,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        static EXTENSION_MAP: &[(&[&str], Language)] = &[
            (&["js", "jsx", "mjs", "cjs"], Language::JavaScript),
            (&["ts", "mts", "cts"], Language::TypeScript),
            (&["tsx"], Language::Tsx),
        ];

        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext))
            .map(|(_, lang)| *lang)
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// All extensions the engine will pick up during enumeration.
    pub fn known_extensions() -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs", "ts", "mts", "cts", "tsx"]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// Source extent of a node: 1-based lines, 0-based columns. Serialises as
/// `{start: {line, col}, end: {line, col}}`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "SpanRepr", from = "SpanRepr")]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Serialize, Deserialize)]
struct SpanRepr {
    start: Position,
    end: Position,
}

#[derive(Serialize, Deserialize)]
struct Position {
    line: usize,
    col: usize,
}

impl From<Span> for SpanRepr {
    fn from(span: Span) -> Self {
        Self {
            start: Position {
                line: span.start_line,
                col: span.start_column,
            },
            end: Position {
                line: span.end_line,
                col: span.end_column,
            },
        }
    }
}

impl From<SpanRepr> for Span {
    fn from(repr: SpanRepr) -> Self {
        Self {
            start_line: repr.start.line,
            start_column: repr.start.col,
            end_line: repr.end.line,
            end_column: repr.end.col,
        }
    }
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

/// Derive the module name used in qualified names: the path relative to the
/// project root with the extension stripped and separators normalised to `/`.
pub fn module_name(project_root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(project_root).unwrap_or(file);
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("ts"), Language::TypeScript);
        assert_eq!(Language::from_extension("tsx"), Language::Tsx);
        assert_eq!(Language::from_extension("mjs"), Language::JavaScript);
        assert_eq!(Language::from_extension("py"), Language::Unknown);
        assert_eq!(Language::from_extension("rs"), Language::Unknown);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("src/app.ts")),
            Language::TypeScript
        );
        assert_eq!(Language::from_path(Path::new("README")), Language::Unknown);
    }

    #[test]
    fn test_module_name_strips_extension_and_normalises() {
        let root = PathBuf::from("/project");
        let file = root.join("src").join("utils").join("math.ts");
        assert_eq!(module_name(&root, &file), "src/utils/math");
    }

    #[test]
    fn test_module_name_outside_root_falls_back_to_path() {
        let root = PathBuf::from("/project");
        let file = PathBuf::from("other/helper.js");
        assert_eq!(module_name(&root, &file), "other/helper");
    }

    #[test]
    fn test_span_contains_line() {
        let span = Span::new(3, 0, 8, 1);
        assert!(span.contains_line(3));
        assert!(span.contains_line(8));
        assert!(!span.contains_line(2));
        assert!(!span.contains_line(9));
    }

    #[test]
    fn test_span_serialises_nested() {
        let span = Span::new(2, 4, 3, 0);
        let json = serde_json::to_value(span).unwrap();
        assert_eq!(json["start"]["line"], 2);
        assert_eq!(json["start"]["col"], 4);
        assert_eq!(json["end"]["line"], 3);

        let back: Span = serde_json::from_value(json).unwrap();
        assert_eq!(back, span);
    }
}
