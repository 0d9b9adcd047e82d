//! L1: module structure extraction.
//!
//! Walks one parse tree and produces a [`ModuleInfo`] value: imports,
//! exports, functions (including arrow- and expression-valued bindings),
//! classes, interfaces, type aliases, variables, and a content hash.

pub mod classes;
pub mod extractor;
pub mod functions;
pub mod imports;
pub mod types;

pub use extractor::{extract_from_parsed, extract_module};
pub use types::{
    ClassInfo, ExportInfo, ExportType, FunctionInfo, FunctionKind, ImportInfo, ImportedName,
    InterfaceInfo, ModuleInfo, ParameterInfo, PropertyInfo, TypeAliasInfo, VariableInfo,
    VariableKind, Visibility,
};
