//! Import and export extraction for the structure layer.

use crate::parsers::{node_line, node_text, string_literal};
use crate::structure::types::{ExportInfo, ImportInfo, ImportedName};
use tree_sitter::Node;

/// Parse an `import_statement` into a single import record.
pub fn parse_import(node: &Node, source: &str) -> Option<ImportInfo> {
    let source_node = node.child_by_field_name("source")?;
    let statement_text = node_text(node, source);
    let is_type_only = statement_text.starts_with("import type");

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "import_clause" {
            parse_import_clause(&child, source, is_type_only, &mut names);
        }
    }

    Some(ImportInfo {
        module: string_literal(&source_node, source),
        names,
        is_type_only,
        is_dynamic: false,
        line: node_line(node),
    })
}

fn parse_import_clause(
    clause: &Node,
    source: &str,
    statement_type_only: bool,
    names: &mut Vec<ImportedName>,
) {
    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(ImportedName {
                name: node_text(&child, source).to_string(),
                alias: None,
                is_default: true,
                is_namespace: false,
                is_type_only: statement_type_only,
            }),
            "namespace_import" => {
                let mut ns_cursor = child.walk();
                if let Some(ident) = child
                    .children(&mut ns_cursor)
                    .find(|c| c.kind() == "identifier")
                {
                    names.push(ImportedName {
                        name: node_text(&ident, source).to_string(),
                        alias: None,
                        is_default: false,
                        is_namespace: true,
                        is_type_only: statement_type_only,
                    });
                };
            }
            "named_imports" => {
                let mut named_cursor = child.walk();
                for specifier in child.children(&mut named_cursor) {
                    if specifier.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name_node) = specifier.child_by_field_name("name") else {
                        continue;
                    };
                    let specifier_type_only =
                        node_text(&specifier, source).starts_with("type ");
                    names.push(ImportedName {
                        name: node_text(&name_node, source).to_string(),
                        alias: specifier
                            .child_by_field_name("alias")
                            .map(|a| node_text(&a, source).to_string()),
                        is_default: false,
                        is_namespace: false,
                        is_type_only: statement_type_only || specifier_type_only,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Scan the whole tree for `import('...')` expressions.
pub fn collect_dynamic_imports(root: &Node, source: &str, out: &mut Vec<ImportInfo>) {
    if root.kind() == "call_expression" {
        if let Some(function) = root.child_by_field_name("function") {
            if function.kind() == "import" {
                if let Some(args) = root.child_by_field_name("arguments") {
                    let mut cursor = args.walk();
                    if let Some(arg) = args.children(&mut cursor).find(|c| c.kind() == "string") {
                        out.push(ImportInfo {
                            module: string_literal(&arg, source),
                            names: Vec::new(),
                            is_type_only: false,
                            is_dynamic: true,
                            line: node_line(root),
                        });
                    };
                }
            }
        }
    }
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        collect_dynamic_imports(&child, source, out);
    }
}

/// Export entries of an `export_statement` that do not wrap a declaration:
/// `export { X, Y as Z }`, `export { X } from './a'`, `export * from './a'`,
/// and `export default <expression>`.
pub fn parse_export_entries(node: &Node, source: &str) -> Vec<ExportInfo> {
    let mut entries = Vec::new();
    let line = node_line(node);
    let source_module = node
        .child_by_field_name("source")
        .map(|s| string_literal(&s, source));
    let is_type_only = node_text(node, source).starts_with("export type");

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "export_clause" => {
                let mut clause_cursor = child.walk();
                for specifier in child.children(&mut clause_cursor) {
                    if specifier.kind() != "export_specifier" {
                        continue;
                    }
                    let Some(name_node) = specifier.child_by_field_name("name") else {
                        continue;
                    };
                    let local = node_text(&name_node, source).to_string();
                    let alias = specifier
                        .child_by_field_name("alias")
                        .map(|a| node_text(&a, source).to_string());
                    entries.push(ExportInfo {
                        name: alias.clone().unwrap_or_else(|| local.clone()),
                        local_name: Some(local),
                        is_default: false,
                        is_re_export: source_module.is_some(),
                        source_module: source_module.clone(),
                        is_type_only,
                        line,
                    });
                }
            }
            "*" => {
                entries.push(ExportInfo {
                    name: "*".to_string(),
                    local_name: None,
                    is_default: false,
                    is_re_export: true,
                    source_module: source_module.clone(),
                    is_type_only,
                    line,
                });
            }
            _ => {}
        }
    }

    // `export default <expr>` with no declaration child.
    if entries.is_empty() && node.child_by_field_name("declaration").is_none() {
        if let Some(value) = node.child_by_field_name("value") {
            let local = if value.kind() == "identifier" {
                Some(node_text(&value, source).to_string())
            } else {
                None
            };
            entries.push(ExportInfo {
                name: "default".to_string(),
                local_name: local,
                is_default: true,
                is_re_export: false,
                source_module: None,
                is_type_only: false,
                line,
            });
        }
    }

    entries
}
