//! Per-file call scan: syntactic call sites grouped by enclosing function.

use crate::parsers::{node_column, node_line, node_text, ParsedFile};
use tree_sitter::Node;

/// One call site observed inside a function body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedCall {
    pub callee: String,
    pub line: usize,
    pub column: usize,
    pub is_method_call: bool,
    pub receiver: Option<String>,
    pub argument_count: usize,
}

/// Calls per declared function, in source order. Keys are the in-file
/// qualified names: `name` for functions, `Class.method` for methods.
#[derive(Debug, Default)]
pub struct FileCallScan {
    callers: Vec<(String, Vec<ScannedCall>)>,
}

impl FileCallScan {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScannedCall])> {
        self.callers
            .iter()
            .map(|(name, calls)| (name.as_str(), calls.as_slice()))
    }

    pub fn calls_of(&self, caller: &str) -> Option<&[ScannedCall]> {
        self.callers
            .iter()
            .find(|(name, _)| name == caller)
            .map(|(_, calls)| calls.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }

    fn record(&mut self, caller: &str, call: ScannedCall) {
        let entry = match self.callers.iter_mut().find(|(name, _)| name == caller) {
            Some(entry) => entry,
            None => {
                self.callers.push((caller.to_string(), Vec::new()));
                self.callers.last_mut().unwrap()
            }
        };
        // One entry per distinct callee, first occurrence wins.
        if !entry.1.iter().any(|c| c.callee == call.callee) {
            entry.1.push(call);
        }
    }

    fn ensure_caller(&mut self, caller: &str) {
        if !self.callers.iter().any(|(name, _)| name == caller) {
            self.callers.push((caller.to_string(), Vec::new()));
        }
    }
}

/// Walk one parse tree and collect call sites per declared function.
pub fn scan_calls(parsed: &ParsedFile) -> FileCallScan {
    let mut scan = FileCallScan::default();
    let root = parsed.root();
    walk(&root, &parsed.source, None, None, &mut scan);
    scan
}

fn walk(
    node: &Node,
    source: &str,
    current_function: Option<&str>,
    current_class: Option<&str>,
    scan: &mut FileCallScan,
) {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" => {
            let class_name = node
                .child_by_field_name("name")
                .map(|n| node_text(&n, source).to_string());
            walk_children(node, source, current_function, class_name.as_deref(), scan);
            return;
        }
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                let name = node_text(&name, source).to_string();
                scan.ensure_caller(&name);
                walk_children(node, source, Some(&name), current_class, scan);
                return;
            }
        }
        "method_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                let method = node_text(&name, source);
                let key = match current_class {
                    Some(class) => format!("{class}.{method}"),
                    None => method.to_string(),
                };
                scan.ensure_caller(&key);
                walk_children(node, source, Some(&key), current_class, scan);
                return;
            }
        }
        "variable_declarator" => {
            // `const f = () => ...` / `const f = function () {..}` opens a
            // new caller context named after the variable.
            let is_callable = node
                .child_by_field_name("value")
                .map(|v| matches!(v.kind(), "arrow_function" | "function_expression" | "function"))
                .unwrap_or(false);
            if is_callable {
                if let Some(name) = node.child_by_field_name("name") {
                    if name.kind() == "identifier" {
                        let name = node_text(&name, source).to_string();
                        scan.ensure_caller(&name);
                        walk_children(node, source, Some(&name), current_class, scan);
                        return;
                    }
                }
            }
        }
        "call_expression" => {
            if let (Some(caller), Some(call)) = (current_function, scanned_call(node, source)) {
                scan.record(caller, call);
            }
        }
        _ => {}
    }

    walk_children(node, source, current_function, current_class, scan);
}

fn walk_children(
    node: &Node,
    source: &str,
    current_function: Option<&str>,
    current_class: Option<&str>,
    scan: &mut FileCallScan,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(&child, source, current_function, current_class, scan);
    }
}

/// Extract the callee of one `call_expression`. Index access, computed
/// properties, `import()`, and call-of-call are dynamic and go unrecorded.
fn scanned_call(node: &Node, source: &str) -> Option<ScannedCall> {
    let function = node.child_by_field_name("function")?;
    let argument_count = node
        .child_by_field_name("arguments")
        .map(|args| args.named_child_count())
        .unwrap_or(0);

    match function.kind() {
        "identifier" => Some(ScannedCall {
            callee: node_text(&function, source).to_string(),
            line: node_line(node),
            column: node_column(node),
            is_method_call: false,
            receiver: None,
            argument_count,
        }),
        "member_expression" => {
            let property = function.child_by_field_name("property")?;
            if property.kind() != "property_identifier" {
                return None;
            }
            let receiver = function
                .child_by_field_name("object")
                .map(|o| node_text(&o, source).to_string());
            Some(ScannedCall {
                callee: node_text(&property, source).to_string(),
                line: node_line(node),
                column: node_column(node),
                is_method_call: true,
                receiver,
                argument_count,
            })
        }
        _ => None,
    }
}
