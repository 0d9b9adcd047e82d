//! L1 extractor: one parse tree in, one `ModuleInfo` out.

use crate::core::errors::Result;
use crate::core::Language;
use crate::parsers::{
    self, clean_block_comment, has_child_token, node_line, node_text, ParsedFile,
};
use crate::structure::classes::{parse_class, parse_interface, parse_type_alias};
use crate::structure::functions::{function_from_declarator, parse_function_declaration};
use crate::structure::imports::{collect_dynamic_imports, parse_export_entries, parse_import};
use crate::structure::types::{
    ExportInfo, ExportType, FunctionInfo, FunctionKind, ModuleInfo, VariableInfo, VariableKind,
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;
use tree_sitter::Node;

/// Parse source text and extract its module structure.
pub fn extract_module(source: &str, path: &Path, language: Language) -> Result<ModuleInfo> {
    let parsed = parsers::parse_source(source, path, language)?;
    Ok(extract_from_parsed(&parsed))
}

/// Extract module structure from an already-parsed file.
pub fn extract_from_parsed(parsed: &ParsedFile) -> ModuleInfo {
    let mut module = ModuleInfo::empty(parsed.path.clone(), parsed.language);
    module.content_hash = content_hash(&parsed.source);

    let root = parsed.root();
    module.docstring = module_docstring(&root, &parsed.source);

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        extract_top_level(&child, &parsed.source, &mut module);
    }

    let mut dynamic = Vec::new();
    collect_dynamic_imports(&root, &parsed.source, &mut dynamic);
    module.imports.extend(dynamic);

    debug!(
        file = %parsed.path.display(),
        functions = module.functions.len(),
        classes = module.classes.len(),
        "extracted module structure"
    );
    module
}

pub fn content_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A leading `/* */` comment is the module docstring.
fn module_docstring(root: &Node, source: &str) -> Option<String> {
    let first = root.child(0)?;
    if first.kind() != "comment" {
        return None;
    }
    let text = node_text(&first, source);
    if !text.starts_with("/*") {
        return None;
    }
    let cleaned = clean_block_comment(text);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn extract_top_level(node: &Node, source: &str, module: &mut ModuleInfo) {
    match node.kind() {
        "import_statement" => {
            if let Some(import) = parse_import(node, source) {
                module.imports.push(import);
            }
        }
        "export_statement" => extract_export(node, source, module),
        "function_declaration" | "generator_function_declaration" => {
            if let Some(func) = parse_function_declaration(node, source) {
                module.functions.push(func);
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            if let Some(class) = parse_class(node, source) {
                module.classes.push(class);
            }
        }
        "interface_declaration" => {
            if let Some(interface) = parse_interface(node, source) {
                module.interfaces.push(interface);
            }
        }
        "type_alias_declaration" => {
            if let Some(alias) = parse_type_alias(node, source) {
                module.type_aliases.push(alias);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            extract_variable_statement(node, source, module, false);
        }
        "expression_statement" => {
            // Top-level `name = function () {..}` / `name = () => ..`.
            if let Some(first) = node.child(0) {
                if first.kind() == "assignment_expression" {
                    extract_assigned_function(&first, source, module);
                }
            }
        }
        _ => {}
    }
}

/// Handle `export ...`: promote a wrapped declaration and always record the
/// export entry itself.
fn extract_export(node: &Node, source: &str, module: &mut ModuleInfo) {
    let is_default = has_child_token(node, "default");
    let export_type = if is_default {
        ExportType::Default
    } else {
        ExportType::Named
    };

    if let Some(declaration) = node.child_by_field_name("declaration") {
        let line = node_line(node);
        match declaration.kind() {
            "function_declaration" | "generator_function_declaration" => {
                if let Some(mut func) = parse_function_declaration(&declaration, source) {
                    func.is_exported = true;
                    func.export_type = export_type;
                    if func.docstring.is_none() {
                        func.docstring = parsers::docstring_before(node, source);
                    }
                    push_named_export(module, &func.name, is_default, false, line);
                    module.functions.push(func);
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(mut class) = parse_class(&declaration, source) {
                    class.is_exported = true;
                    class.export_type = export_type;
                    push_named_export(module, &class.name, is_default, false, line);
                    module.classes.push(class);
                }
            }
            "interface_declaration" => {
                if let Some(mut interface) = parse_interface(&declaration, source) {
                    interface.is_exported = true;
                    push_named_export(module, &interface.name, is_default, true, line);
                    module.interfaces.push(interface);
                }
            }
            "type_alias_declaration" => {
                if let Some(mut alias) = parse_type_alias(&declaration, source) {
                    alias.is_exported = true;
                    push_named_export(module, &alias.name, is_default, true, line);
                    module.type_aliases.push(alias);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let before = module.declared_names();
                extract_variable_statement(&declaration, source, module, true);
                for name in module.declared_names().difference(&before) {
                    module.exports.push(ExportInfo {
                        name: name.clone(),
                        local_name: None,
                        is_default: false,
                        is_re_export: false,
                        source_module: None,
                        is_type_only: false,
                        line,
                    });
                }
            }
            _ => {}
        }
        return;
    }

    module.exports.extend(parse_export_entries(node, source));
}

fn push_named_export(
    module: &mut ModuleInfo,
    name: &str,
    is_default: bool,
    is_type_only: bool,
    line: usize,
) {
    module.exports.push(ExportInfo {
        name: name.to_string(),
        local_name: None,
        is_default,
        is_re_export: false,
        source_module: None,
        is_type_only,
        line,
    });
}

/// Walk a `lexical_declaration` / `variable_declaration`: arrow- and
/// function-valued declarators become functions, everything else a variable.
fn extract_variable_statement(
    node: &Node,
    source: &str,
    module: &mut ModuleInfo,
    is_exported: bool,
) {
    let kind = variable_kind(node, source);
    let export_type = if is_exported {
        ExportType::Named
    } else {
        ExportType::None
    };

    let mut cursor = node.walk();
    for declarator in node.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        if let Some(mut func) = function_from_declarator(&declarator, source) {
            func.is_exported = is_exported;
            func.export_type = export_type;
            module.functions.push(func);
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() != "identifier" {
            continue;
        }
        module.variables.push(VariableInfo {
            name: node_text(&name_node, source).to_string(),
            kind,
            variable_type: declarator
                .child_by_field_name("type")
                .map(|t| parsers::annotation_text(&t, source)),
            is_exported,
            line: node_line(&declarator),
        });
    }
}

fn variable_kind(node: &Node, source: &str) -> VariableKind {
    let text = node_text(node, source);
    if text.starts_with("const") {
        VariableKind::Const
    } else if text.starts_with("let") {
        VariableKind::Let
    } else {
        VariableKind::Var
    }
}

/// `name = function () {..}` at module scope.
fn extract_assigned_function(assignment: &Node, source: &str, module: &mut ModuleInfo) {
    let Some(left) = assignment.child_by_field_name("left") else {
        return;
    };
    let Some(right) = assignment.child_by_field_name("right") else {
        return;
    };
    if left.kind() != "identifier" {
        return;
    }
    let kind = match right.kind() {
        "arrow_function" => FunctionKind::Arrow,
        "function_expression" | "function" => FunctionKind::Expression,
        _ => return,
    };
    let mut func = FunctionInfo::new(
        node_text(&left, source),
        kind,
        node_line(assignment),
        parsers::node_span(assignment),
    );
    func.is_async = has_child_token(&right, "async");
    if let Some(params) = right.child_by_field_name("parameters") {
        func.params = crate::structure::functions::parse_parameters(&params, source);
    }
    module.functions.push(func);
}

impl ModuleInfo {
    fn declared_names(&self) -> std::collections::BTreeSet<String> {
        self.functions
            .iter()
            .map(|f| f.name.clone())
            .chain(self.variables.iter().map(|v| v.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(source: &str) -> ModuleInfo {
        extract_module(source, &PathBuf::from("test.ts"), Language::TypeScript).unwrap()
    }

    #[test]
    fn test_simple_module() {
        let module = extract(
            r#"/** Math helpers. */
import { round } from './round';

export function add(a: number, b: number): number {
    return a + b;
}

const scale = (x: number) => x * 2;

export const LIMIT: number = 100;
"#,
        );

        assert_eq!(module.docstring.as_deref(), Some("Math helpers."));
        assert_eq!(module.imports.len(), 1);
        assert_eq!(module.functions.len(), 2);
        assert_eq!(module.functions[0].name, "add");
        assert!(module.functions[0].is_exported);
        assert_eq!(module.functions[1].name, "scale");
        assert_eq!(module.functions[1].kind, FunctionKind::Arrow);
        assert_eq!(module.variables.len(), 1);
        assert_eq!(module.variables[0].name, "LIMIT");
        assert!(module.variables[0].is_exported);
        assert!(module
            .exports
            .iter()
            .any(|e| e.name == "add" && !e.is_default));
        assert!(module.exports.iter().any(|e| e.name == "LIMIT"));
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        let module = extract("const x = 1;\n");
        assert_eq!(module.content_hash.len(), 64);
        assert!(module
            .content_hash
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // Stable across runs.
        assert_eq!(module.content_hash, content_hash("const x = 1;\n"));
    }

    #[test]
    fn test_export_default_class() {
        let module = extract("export default class App { run() {} }");
        assert_eq!(module.classes.len(), 1);
        assert_eq!(module.classes[0].export_type, ExportType::Default);
        assert!(module.exports.iter().any(|e| e.is_default));
    }

    #[test]
    fn test_standalone_exports_need_no_declaration() {
        let module = extract("const x = 1;\nexport { x };\nexport default x;");
        assert_eq!(module.exports.len(), 2);
        assert!(module.exports.iter().any(|e| !e.is_default && e.name == "x"));
        assert!(module.exports.iter().any(|e| e.is_default));
    }

    #[test]
    fn test_interfaces_and_aliases_extracted() {
        let module = extract(
            "export interface Shape { area(): number; }\nexport type Id = string;\n",
        );
        assert_eq!(module.interfaces.len(), 1);
        assert!(module.interfaces[0].is_exported);
        assert_eq!(module.type_aliases.len(), 1);
        assert!(module.type_aliases[0].is_exported);
    }

    #[test]
    fn test_variable_kinds() {
        let module = extract("const a = 1;\nlet b = 2;\nvar c = 3;");
        let kinds: Vec<VariableKind> = module.variables.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![VariableKind::Const, VariableKind::Let, VariableKind::Var]
        );
    }

    #[test]
    fn test_parse_failure_yields_empty_not_panic() {
        // Unbalanced source still yields a module record.
        let module = extract("function broken( {");
        assert!(module.classes.is_empty());
    }

    #[test]
    fn test_top_level_assigned_function() {
        let module = extract("handler = async () => {};");
        assert_eq!(module.functions.len(), 1);
        assert_eq!(module.functions[0].name, "handler");
        assert!(module.functions[0].is_async);
    }
}
