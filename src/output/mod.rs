//! Output projections: one schema, two views.
//!
//! The full view is the module record itself; the compact view projects it
//! down to signatures while keeping every declaration category, interfaces,
//! type aliases, variables, and exports included.

use crate::structure::{ModuleInfo, Visibility};
use serde::Serialize;
use std::path::PathBuf;

/// Signature-level projection of a module.
#[derive(Clone, Debug, Serialize)]
pub struct CompactModule {
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<CompactClass>,
    pub interfaces: Vec<CompactInterface>,
    pub type_aliases: Vec<String>,
    pub variables: Vec<String>,
    pub content_hash: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompactClass {
    pub name: String,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompactInterface {
    pub name: String,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
}

/// Project a module to its compact view.
pub fn compact_view(module: &ModuleInfo) -> CompactModule {
    CompactModule {
        file_path: module.file_path.clone(),
        docstring: module.docstring.clone(),
        imports: module
            .imports
            .iter()
            .map(|i| {
                let names: Vec<&str> = i.names.iter().map(|n| n.local_name()).collect();
                if names.is_empty() {
                    i.module.clone()
                } else {
                    format!("{} \u{2190} {}", names.join(", "), i.module)
                }
            })
            .collect(),
        exports: module
            .exports
            .iter()
            .map(|e| {
                let mut rendered = e.name.clone();
                if e.is_default {
                    rendered.push_str(" (default)");
                }
                if let Some(source) = &e.source_module {
                    rendered.push_str(&format!(" from {source}"));
                }
                rendered
            })
            .collect(),
        functions: module.functions.iter().map(|f| f.signature()).collect(),
        classes: module
            .classes
            .iter()
            .map(|c| CompactClass {
                name: c.name.clone(),
                methods: c.methods.iter().map(|m| m.signature()).collect(),
                properties: c
                    .properties
                    .iter()
                    .map(|p| render_property(&p.name, &p.property_type, p.visibility))
                    .collect(),
            })
            .collect(),
        interfaces: module
            .interfaces
            .iter()
            .map(|i| CompactInterface {
                name: i.name.clone(),
                methods: i.methods.iter().map(|m| m.signature()).collect(),
                properties: i
                    .properties
                    .iter()
                    .map(|p| render_property(&p.name, &p.property_type, p.visibility))
                    .collect(),
            })
            .collect(),
        type_aliases: module
            .type_aliases
            .iter()
            .map(|t| format!("{} = {}", t.name, t.definition))
            .collect(),
        variables: module
            .variables
            .iter()
            .map(|v| match &v.variable_type {
                Some(ty) => format!("{}: {ty}", v.name),
                None => v.name.clone(),
            })
            .collect(),
        content_hash: module.content_hash.clone(),
    }
}

fn render_property(name: &str, ty: &Option<String>, visibility: Visibility) -> String {
    let prefix = match visibility {
        Visibility::Private => "private ",
        Visibility::Protected => "protected ",
        Visibility::Public => "public ",
        Visibility::None => "",
    };
    match ty {
        Some(ty) => format!("{prefix}{name}: {ty}"),
        None => format!("{prefix}{name}"),
    }
}

/// Serialise any record to pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use crate::structure::extract_module;
    use std::path::Path;

    fn module(source: &str) -> ModuleInfo {
        extract_module(source, Path::new("m.ts"), Language::TypeScript).unwrap()
    }

    #[test]
    fn test_compact_view_keeps_every_category() {
        let module = module(
            r#"
import { a } from './a';
export interface Shape { area(): number; }
export type Id = string;
export const LIMIT = 10;
export function run(): void {}
export { a as renamed };
"#,
        );
        let compact = compact_view(&module);
        assert!(!compact.imports.is_empty());
        assert!(!compact.interfaces.is_empty());
        assert!(!compact.type_aliases.is_empty());
        assert!(!compact.variables.is_empty());
        assert!(!compact.functions.is_empty());
        assert!(compact.exports.len() >= 4);
    }

    #[test]
    fn test_compact_functions_are_signatures() {
        let module = module("export function add(a: number, b: number): number { return a + b; }");
        let compact = compact_view(&module);
        assert_eq!(
            compact.functions,
            vec!["function add(a: number, b: number): number"]
        );
    }
}
