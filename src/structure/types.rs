//! Module-structure records (L1).
//!
//! Value types produced by the structure extractor. Every record is created
//! once by the extractor and immutable afterwards; serialisation is stable
//! (snake_case enums, ordered sequences).

use crate::core::{Language, Span};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything known about one source file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModuleInfo {
    pub file_path: PathBuf,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub type_aliases: Vec<TypeAliasInfo>,
    pub variables: Vec<VariableInfo>,
    /// Lowercase hex SHA-256 of the source text.
    pub content_hash: String,
}

impl ModuleInfo {
    pub fn empty(file_path: PathBuf, language: Language) -> Self {
        Self {
            file_path,
            language,
            docstring: None,
            imports: Vec::new(),
            exports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            type_aliases: Vec::new(),
            variables: Vec::new(),
            content_hash: String::new(),
        }
    }
}

/// One import statement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImportInfo {
    /// Module specifier, quotes stripped (`./utils`, `lodash`).
    pub module: String,
    pub names: Vec<ImportedName>,
    pub is_type_only: bool,
    /// True for `import('...')` expressions.
    pub is_dynamic: bool,
    pub line: usize,
}

/// One binding introduced by an import.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImportedName {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub is_default: bool,
    pub is_namespace: bool,
    pub is_type_only: bool,
}

impl ImportedName {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            is_default: false,
            is_namespace: false,
            is_type_only: false,
        }
    }

    /// The identifier visible in module scope (alias when present).
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One exported binding.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    pub is_default: bool,
    pub is_re_export: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
    pub is_type_only: bool,
    pub line: usize,
}

/// How a declaration reached module scope.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    Named,
    Default,
    #[default]
    None,
}

/// The syntactic shape of a callable.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// `function foo() {}`
    #[default]
    Declaration,
    /// `const foo = () => {}`
    Arrow,
    /// `const foo = function () {}`
    Expression,
    /// Class or object method.
    Method,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    #[default]
    None,
}

/// One callable: declaration, arrow/function-expression binding, or method.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    pub kind: FunctionKind,
    pub params: Vec<ParameterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub is_method: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_exported: bool,
    pub export_type: ExportType,
    pub decorators: Vec<String>,
    pub line: usize,
    pub span: Span,
    pub visibility: Visibility,
    pub is_static: bool,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, kind: FunctionKind, line: usize, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            return_type: None,
            docstring: None,
            is_method: matches!(kind, FunctionKind::Method),
            is_async: false,
            is_generator: false,
            is_exported: false,
            export_type: ExportType::None,
            decorators: Vec::new(),
            line,
            span,
            visibility: Visibility::None,
            is_static: false,
        }
    }

    /// Render a human-readable signature consistent with the record:
    /// async prefix iff async, `*` iff generator, params joined by `, `,
    /// `...` prefix on rest params, type suffixes iff typed.
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ParameterInfo::render)
            .collect::<Vec<_>>()
            .join(", ");

        let mut sig = String::new();
        if self.is_async {
            sig.push_str("async ");
        }
        if !self.is_method {
            sig.push_str("function");
            if self.is_generator {
                sig.push('*');
            }
            sig.push(' ');
        } else if self.is_generator {
            sig.push('*');
        }
        sig.push_str(&self.name);
        sig.push('(');
        sig.push_str(&params);
        sig.push(')');
        if let Some(ret) = &self.return_type {
            sig.push_str(": ");
            sig.push_str(ret);
        }
        sig
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub is_rest: bool,
    pub is_optional: bool,
}

impl ParameterInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        if self.is_rest {
            out.push_str("...");
        }
        out.push_str(&self.name);
        if self.is_optional {
            out.push('?');
        }
        if let Some(ty) = &self.param_type {
            out.push_str(": ");
            out.push_str(ty);
        }
        if let Some(default) = &self.default_value {
            out.push_str(" = ");
            out.push_str(default);
        }
        out
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub bases: Vec<String>,
    pub implements: Vec<String>,
    pub methods: Vec<FunctionInfo>,
    pub properties: Vec<PropertyInfo>,
    pub is_abstract: bool,
    pub is_exported: bool,
    pub export_type: ExportType,
    pub decorators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub line: usize,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_optional: bool,
    pub line: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InterfaceInfo {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<FunctionInfo>,
    pub properties: Vec<PropertyInfo>,
    pub is_exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub line: usize,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TypeAliasInfo {
    pub name: String,
    /// Raw text of the aliased type.
    pub definition: String,
    pub is_exported: bool,
    pub line: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub kind: VariableKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    pub is_exported: bool,
    pub line: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(1, 0, 1, 10)
    }

    #[test]
    fn test_signature_plain_function() {
        let mut func = FunctionInfo::new("add", FunctionKind::Declaration, 1, span());
        func.params = vec![
            ParameterInfo {
                name: "a".into(),
                param_type: Some("number".into()),
                ..Default::default()
            },
            ParameterInfo {
                name: "b".into(),
                param_type: Some("number".into()),
                ..Default::default()
            },
        ];
        func.return_type = Some("number".into());
        assert_eq!(
            func.signature(),
            "function add(a: number, b: number): number"
        );
    }

    #[test]
    fn test_signature_async_generator() {
        let mut func = FunctionInfo::new("stream", FunctionKind::Declaration, 1, span());
        func.is_async = true;
        func.is_generator = true;
        assert_eq!(func.signature(), "async function* stream()");
    }

    #[test]
    fn test_signature_rest_and_optional() {
        let mut func = FunctionInfo::new("log", FunctionKind::Declaration, 1, span());
        func.params = vec![
            ParameterInfo {
                name: "level".into(),
                is_optional: true,
                ..Default::default()
            },
            ParameterInfo {
                name: "args".into(),
                param_type: Some("string[]".into()),
                is_rest: true,
                ..Default::default()
            },
        ];
        assert_eq!(func.signature(), "function log(level?, ...args: string[])");
    }

    #[test]
    fn test_signature_method_omits_keyword() {
        let mut func = FunctionInfo::new("validate", FunctionKind::Method, 3, span());
        func.params = vec![ParameterInfo::named("input")];
        assert_eq!(func.signature(), "validate(input)");
    }

    #[test]
    fn test_imported_name_local_name() {
        let mut name = ImportedName::named("helper");
        assert_eq!(name.local_name(), "helper");
        name.alias = Some("h".into());
        assert_eq!(name.local_name(), "h");
    }

    #[test]
    fn test_module_round_trip() {
        let mut module = ModuleInfo::empty(PathBuf::from("a.ts"), Language::TypeScript);
        module.functions.push(FunctionInfo::new(
            "f",
            FunctionKind::Declaration,
            1,
            span(),
        ));
        module.content_hash = "ab".repeat(32);

        let json = serde_json::to_string(&module).unwrap();
        let back: ModuleInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(module, back);
    }
}
