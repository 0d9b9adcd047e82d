//! Parse-tree adapter over tree-sitter.
//!
//! Wraps grammar loading and parsing for the supported languages and provides
//! the node helpers the extractors share. Grammars are process-wide immutable
//! state behind single-shot initialisers, so concurrent first calls cannot
//! race the load. Trees are consumed read-only by the layers above.

use crate::core::errors::{AnalysisError, Result};
use crate::core::{Language, Span};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tree_sitter::{Node, Parser, Tree};

/// A parsed source file: the tree plus everything needed to read it.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub tree: Tree,
    pub source: String,
    pub path: PathBuf,
    pub language: Language,
}

impl ParsedFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

fn javascript_language() -> &'static tree_sitter::Language {
    static LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    LANG.get_or_init(|| tree_sitter_javascript::LANGUAGE.into())
}

fn typescript_language() -> &'static tree_sitter::Language {
    static LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    LANG.get_or_init(|| tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
}

fn tsx_language() -> &'static tree_sitter::Language {
    static LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    LANG.get_or_init(|| tree_sitter_typescript::LANGUAGE_TSX.into())
}

fn grammar_for(language: Language) -> Result<&'static tree_sitter::Language> {
    match language {
        Language::JavaScript => Ok(javascript_language()),
        Language::TypeScript => Ok(typescript_language()),
        Language::Tsx => Ok(tsx_language()),
        Language::Unknown => Err(AnalysisError::ParserLoad {
            language: language.to_string(),
            message: "no grammar wired for this language".to_string(),
        }),
    }
}

/// Parse source text for the given language.
///
/// Partial parses are acceptable: extractors tolerate error nodes by
/// skipping. Only a completely unusable tree is reported as a parse error.
pub fn parse_source(source: &str, path: &Path, language: Language) -> Result<ParsedFile> {
    let grammar = grammar_for(language)?;
    let mut parser = Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| AnalysisError::ParserLoad {
            language: language.to_string(),
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::parse(path, "parser produced no tree"))?;

    Ok(ParsedFile {
        tree,
        source: source.to_string(),
        path: path.to_path_buf(),
        language,
    })
}

/// Read a file and parse it according to its extension.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    let language = Language::from_path(path);
    if !language.is_supported() {
        return Err(AnalysisError::UnsupportedFile {
            path: path.to_path_buf(),
        });
    }
    let source = std::fs::read_to_string(path)?;
    parse_source(&source, path, language)
}

/// Original source text of a node.
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// 1-based start line of a node.
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// 0-based start column of a node.
pub fn node_column(node: &Node) -> usize {
    node.start_position().column
}

pub fn node_span(node: &Node) -> Span {
    Span {
        start_line: node.start_position().row + 1,
        start_column: node.start_position().column,
        end_line: node.end_position().row + 1,
        end_column: node.end_position().column,
    }
}

/// First child with the given kind, if any.
pub fn child_of_kind<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).find(|c| c.kind() == kind);
    result
}

/// All children with the given kind, in order.
pub fn children_of_kind<'t>(node: &Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == kind)
        .collect()
}

/// True when the node has a child token of the given kind (e.g. `async`,
/// `default`, `static`).
pub fn has_child_token(node: &Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).any(|c| c.kind() == kind);
    result
}

/// Strip the leading `:` from a `type_annotation` node's text.
pub fn annotation_text(node: &Node, source: &str) -> String {
    node_text(node, source)
        .trim_start_matches(':')
        .trim()
        .to_string()
}

/// Strip quotes from a `string` node's text.
pub fn string_literal(node: &Node, source: &str) -> String {
    node_text(node, source)
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// The doc comment immediately preceding a declaration, if it is a `/** */`
/// block. Line comments are not treated as docs.
pub fn docstring_before(node: &Node, source: &str) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let text = node_text(&prev, source);
    if !text.starts_with("/**") {
        return None;
    }
    Some(clean_block_comment(text))
}

/// Normalise a `/** */` block: strip delimiters and leading `*` gutters.
pub fn clean_block_comment(text: &str) -> String {
    let inner = text
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/");
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
