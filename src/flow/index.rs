//! Function-node index: one pass over a parse tree recording
//! `(class?, name) → function node`, so CFG/DFG/PDG entry points locate a
//! function body without re-scanning the tree per request.

use crate::core::Span;
use crate::parsers::{node_span, node_text, ParsedFile};
use tree_sitter::Node;

/// A located callable and the nodes its analyses start from.
#[derive(Clone)]
pub struct IndexedFunction<'t> {
    /// Bare name, or `Class.method` for methods.
    pub name: String,
    pub class: Option<String>,
    /// The whole function node.
    pub node: Node<'t>,
    /// Body: a statement block, or a bare expression for arrow shorthand.
    pub body: Option<Node<'t>>,
    /// `formal_parameters`, when present.
    pub params: Option<Node<'t>>,
    /// Single unparenthesised arrow parameter.
    pub single_param: Option<Node<'t>>,
    pub span: Span,
}

pub struct FunctionIndex<'t> {
    entries: Vec<IndexedFunction<'t>>,
}

impl<'t> FunctionIndex<'t> {
    /// Index every named callable in the file, nested ones included.
    pub fn build(parsed: &'t ParsedFile) -> Self {
        let mut entries = Vec::new();
        collect(&parsed.root(), &parsed.source, None, &mut entries);
        Self { entries }
    }

    /// Look up by bare name or `Class.method`. For methods the bare method
    /// name also matches when unambiguous within the file.
    pub fn get(&self, name: &str) -> Option<&IndexedFunction<'t>> {
        if let Some(found) = self.entries.iter().find(|f| f.name == name) {
            return Some(found);
        }
        self.entries
            .iter()
            .find(|f| f.class.is_some() && f.name.ends_with(&format!(".{name}")))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect<'t>(
    node: &Node<'t>,
    source: &str,
    current_class: Option<&str>,
    entries: &mut Vec<IndexedFunction<'t>>,
) {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" => {
            let class_name = node
                .child_by_field_name("name")
                .map(|n| node_text(&n, source).to_string());
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect(&child, source, class_name.as_deref(), entries);
            }
            return;
        }
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                entries.push(entry_for(
                    node_text(&name_node, source).to_string(),
                    None,
                    *node,
                ));
            }
        }
        "method_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let method = node_text(&name_node, source);
                let name = match current_class {
                    Some(class) => format!("{class}.{method}"),
                    None => method.to_string(),
                };
                entries.push(entry_for(name, current_class.map(String::from), *node));
            }
        }
        "variable_declarator" => {
            if let Some(value) = node.child_by_field_name("value") {
                if matches!(
                    value.kind(),
                    "arrow_function" | "function_expression" | "function"
                ) {
                    if let Some(name_node) = node.child_by_field_name("name") {
                        if name_node.kind() == "identifier" {
                            entries.push(entry_for(
                                node_text(&name_node, source).to_string(),
                                None,
                                value,
                            ));
                        }
                    }
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(&child, source, current_class, entries);
    }
}

fn entry_for<'t>(name: String, class: Option<String>, node: Node<'t>) -> IndexedFunction<'t> {
    IndexedFunction {
        name,
        class,
        body: node.child_by_field_name("body"),
        params: node.child_by_field_name("parameters"),
        single_param: node.child_by_field_name("parameter"),
        span: node_span(&node),
        node,
    }
}
