//! Integration tests for L1 module-structure extraction.

use depthmap::core::Language;
use depthmap::output::compact_view;
use depthmap::structure::{extract_module, ExportType, FunctionKind, VariableKind, Visibility};
use std::path::Path;

const SERVICE: &str = r#"/**
 * User service: lookups and caching.
 */
import { Database } from './db';
import type { Config } from './config';
import * as util from './util';

export interface User {
    id: string;
    name: string;
    greet(prefix: string): string;
}

export type UserId = string;

const CACHE_LIMIT: number = 256;

export class UserService {
    private db: Database;
    static instances = 0;

    constructor(db: Database) {
        this.db = db;
    }

    async findUser(id: UserId): Promise<User> {
        return this.db.lookup(id);
    }

    private evict(): void {
        util.clear();
    }
}

export function createService(config: Config): UserService {
    return new UserService(connect(config));
}

const connect = (config: Config) => openDatabase(config);

export default createService;
"#;

fn service_module() -> depthmap::ModuleInfo {
    extract_module(SERVICE, Path::new("src/service.ts"), Language::TypeScript).unwrap()
}

#[test]
fn test_module_docstring_and_hash() {
    let module = service_module();
    assert!(module
        .docstring
        .as_deref()
        .unwrap()
        .contains("User service"));
    assert_eq!(module.content_hash.len(), 64);
}

#[test]
fn test_imports_with_kinds() {
    let module = service_module();
    assert_eq!(module.imports.len(), 3);

    let db = &module.imports[0];
    assert_eq!(db.module, "./db");
    assert!(!db.is_type_only);
    assert_eq!(db.names[0].name, "Database");

    let config = &module.imports[1];
    assert!(config.is_type_only);

    let util = &module.imports[2];
    assert!(util.names[0].is_namespace);
    assert_eq!(util.names[0].name, "util");
}

#[test]
fn test_interface_with_signatures() {
    let module = service_module();
    assert_eq!(module.interfaces.len(), 1);
    let user = &module.interfaces[0];
    assert_eq!(user.name, "User");
    assert!(user.is_exported);
    assert_eq!(user.properties.len(), 2);
    assert_eq!(user.methods.len(), 1);
    assert_eq!(user.methods[0].name, "greet");
}

#[test]
fn test_class_members() {
    let module = service_module();
    assert_eq!(module.classes.len(), 1);
    let service = &module.classes[0];
    assert_eq!(service.name, "UserService");
    assert!(service.is_exported);

    let method_names: Vec<&str> = service.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(method_names, vec!["constructor", "findUser", "evict"]);
    assert!(service.methods[1].is_async);
    assert_eq!(service.methods[2].visibility, Visibility::Private);

    assert_eq!(service.properties.len(), 2);
    assert_eq!(service.properties[0].visibility, Visibility::Private);
    assert!(service.properties[1].is_static);
}

#[test]
fn test_functions_include_arrow_bindings() {
    let module = service_module();
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert!(names.contains(&"createService"));
    assert!(names.contains(&"connect"));

    let connect = module
        .functions
        .iter()
        .find(|f| f.name == "connect")
        .unwrap();
    assert_eq!(connect.kind, FunctionKind::Arrow);
    assert_eq!(connect.params.len(), 1);

    let create = module
        .functions
        .iter()
        .find(|f| f.name == "createService")
        .unwrap();
    assert!(create.is_exported);
    assert_eq!(create.export_type, ExportType::Named);
    assert_eq!(create.return_type.as_deref(), Some("UserService"));
}

#[test]
fn test_variables_and_type_aliases() {
    let module = service_module();
    assert_eq!(module.type_aliases.len(), 1);
    assert_eq!(module.type_aliases[0].name, "UserId");

    let cache = module
        .variables
        .iter()
        .find(|v| v.name == "CACHE_LIMIT")
        .unwrap();
    assert_eq!(cache.kind, VariableKind::Const);
    assert_eq!(cache.variable_type.as_deref(), Some("number"));
}

#[test]
fn test_default_export_entry() {
    let module = service_module();
    let default = module.exports.iter().find(|e| e.is_default).unwrap();
    assert_eq!(default.local_name.as_deref(), Some("createService"));
}

#[test]
fn test_serialisation_round_trip() {
    let module = service_module();
    let json = serde_json::to_string(&module).unwrap();
    let back: depthmap::ModuleInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(module, back);
}

#[test]
fn test_compact_view_is_complete() {
    let module = service_module();
    let compact = compact_view(&module);

    assert_eq!(compact.interfaces.len(), 1);
    assert_eq!(compact.type_aliases.len(), 1);
    assert!(!compact.variables.is_empty());
    assert!(!compact.exports.is_empty());
    assert!(compact
        .functions
        .iter()
        .any(|s| s.starts_with("function createService")));
}

#[test]
fn test_signature_rendering_matches_fields() {
    let module = extract_module(
        "export async function* pull(limit?: number, ...rest: string[]): AsyncIterable<string> {}",
        Path::new("gen.ts"),
        Language::TypeScript,
    )
    .unwrap();
    let func = &module.functions[0];
    assert!(func.is_async);
    assert!(func.is_generator);
    assert_eq!(
        func.signature(),
        "async function* pull(limit?: number, ...rest: string[]): AsyncIterable<string>"
    );
}

#[test]
fn test_broken_source_still_yields_module() {
    let module = extract_module(
        "function incomplete( {\nexport const orphan = 1;",
        Path::new("broken.ts"),
        Language::TypeScript,
    )
    .unwrap();
    // Extraction tolerates error nodes by skipping.
    assert_eq!(module.file_path, Path::new("broken.ts"));
    assert_eq!(module.content_hash.len(), 64);
}
