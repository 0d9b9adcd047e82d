//! Integration tests for the project call graph and impact queries.

mod common;

use common::project;
use depthmap::callgraph::{build_call_graph, callers_of, CallType};

#[test]
fn test_cross_file_edge_resolved() {
    let dir = project(&[
        ("a.ts", "export function helper() { return 1; }\n"),
        (
            "b.ts",
            "import { helper } from './a';\n\nfunction main() {\n    helper();\n}\n",
        ),
    ]);
    let build = build_call_graph(dir.path()).unwrap();
    let graph = &build.graph;

    let edges = graph.callees_of("b.main");
    assert_eq!(edges.len(), 1);
    let edge = edges[0];
    assert!(!edge.is_dynamic);
    assert_eq!(edge.call_type, CallType::Direct);
    assert_eq!(
        edge.callee_location.as_ref().unwrap().qualified_name,
        "a.helper"
    );
    assert_eq!(edge.call_site.line, 4);
}

#[test]
fn test_ambiguous_callee_becomes_dynamic() {
    let dir = project(&[
        ("pkg/one.ts", "export function helper() {}\n"),
        ("pkg/two.ts", "export function helper() {}\n"),
        ("main.ts", "function run() { helper(); }\n"),
    ]);
    let build = build_call_graph(dir.path()).unwrap();
    let edges = build.graph.callees_of("main.run");

    assert_eq!(edges.len(), 1);
    assert!(edges[0].is_dynamic);
    assert!(edges[0].callee_location.is_none());
    assert_eq!(edges[0].call_type, CallType::Dynamic);
}

#[test]
fn test_nested_module_qualified_names() {
    let dir = project(&[(
        "src/utils/math.ts",
        "export function square(x: number) { return x * x; }\n",
    )]);
    let build = build_call_graph(dir.path()).unwrap();
    assert!(build.graph.function("src/utils/math.square").is_some());
}

#[test]
fn test_indices_cover_all_edges() {
    let dir = project(&[
        (
            "chain.ts",
            r#"
export function first() { second(); }
export function second() { third(); missing(); }
export function third() {}
"#,
        ),
    ]);
    let build = build_call_graph(dir.path()).unwrap();
    let graph = &build.graph;

    assert!(graph.verify().is_ok());

    // Forward index covers every edge, resolved or not.
    let total: usize = graph
        .functions
        .keys()
        .map(|name| graph.callees_of(name).len())
        .sum();
    assert_eq!(total, graph.edge_count());

    // Backward index covers exactly the resolved ones.
    let resolved: usize = graph
        .functions
        .keys()
        .map(|name| graph.callers_of(name).len())
        .sum();
    let expected = graph
        .edges
        .iter()
        .filter(|e| e.callee_location.is_some())
        .count();
    assert_eq!(resolved, expected);
}

#[test]
fn test_impact_query_depths() {
    let dir = project(&[
        ("core.ts", "export function store() {}\n"),
        (
            "service.ts",
            "import { store } from './core';\nexport function save() { store(); }\n",
        ),
        (
            "api.ts",
            "import { save } from './service';\nexport function handlePost() { save(); }\n",
        ),
    ]);
    let build = build_call_graph(dir.path()).unwrap();

    let direct = callers_of(&build.graph, "core.store", 1);
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].caller, "service.save");
    assert_eq!(direct[0].depth, 1);

    let transitive = callers_of(&build.graph, "core.store", 3);
    assert_eq!(transitive.len(), 2);
    assert!(transitive
        .iter()
        .any(|s| s.caller == "api.handlePost" && s.depth == 2));
}

#[test]
fn test_recursive_functions_terminate() {
    let dir = project(&[(
        "rec.ts",
        "export function ping() { pong(); }\nexport function pong() { ping(); }\n",
    )]);
    let build = build_call_graph(dir.path()).unwrap();
    let sites = callers_of(&build.graph, "rec.ping", 50);
    assert_eq!(sites.len(), 2);
}

#[test]
fn test_method_resolution_within_class() {
    let dir = project(&[(
        "svc.ts",
        r#"
export class Service {
    handle(req: string) {
        return this.parse(req);
    }
    parse(req: string) {
        return req.trim();
    }
}
"#,
    )]);
    let build = build_call_graph(dir.path()).unwrap();
    let edges = build.graph.callees_of("svc.Service.handle");

    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].call_type, CallType::Method);
    assert_eq!(
        edges[0].callee_location.as_ref().unwrap().qualified_name,
        "svc.Service.parse"
    );
    // `trim` resolves nowhere and is dynamic.
    let parse_edges = build.graph.callees_of("svc.Service.parse");
    assert_eq!(parse_edges.len(), 1);
    assert!(parse_edges[0].is_dynamic);
}

#[test]
fn test_deterministic_builds() {
    let files: Vec<(String, String)> = (0..8)
        .map(|i| {
            (
                format!("mod{i}.ts"),
                format!("export function f{i}() {{ f{}(); }}\n", (i + 1) % 8),
            )
        })
        .collect();
    let refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    let dir = project(&refs);

    let first = build_call_graph(dir.path()).unwrap();
    let second = build_call_graph(dir.path()).unwrap();
    assert_eq!(
        first.graph.to_stable_json().unwrap(),
        second.graph.to_stable_json().unwrap()
    );
}

#[test]
fn test_excluded_directories_not_analyzed() {
    let dir = project(&[
        ("src/app.ts", "export function app() {}\n"),
        ("node_modules/lib/index.js", "export function vendor() {}\n"),
    ]);
    let build = build_call_graph(dir.path()).unwrap();
    assert!(build.graph.function("src/app.app").is_some());
    assert!(build
        .graph
        .functions
        .keys()
        .all(|name| !name.contains("vendor")));
}
