//! Data-flow graph construction for one function body.

use crate::core::errors::Result;
use crate::flow::dfg::builtins::js_builtins;
use crate::flow::dfg::types::{DefUseEdge, DfgInfo, RefType, VarRef};
use crate::flow::index::{FunctionIndex, IndexedFunction};
use crate::parsers::{node_column, node_line, node_text, ParsedFile};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Build the DFG for the named function. Returns `Ok(None)` when the
/// function cannot be located.
pub fn build_dfg(parsed: &ParsedFile, function_name: &str) -> Result<Option<DfgInfo>> {
    let index = FunctionIndex::build(parsed);
    let Some(function) = index.get(function_name) else {
        return Ok(None);
    };
    Ok(Some(build_for_indexed(parsed, function)))
}

/// Build the DFG for an already-located function.
pub fn build_for_indexed(parsed: &ParsedFile, function: &IndexedFunction<'_>) -> DfgInfo {
    let mut builder = DfgBuilder {
        source: &parsed.source,
        scope: function.name.clone(),
        builtins: js_builtins(),
        refs: Vec::new(),
        returns: Vec::new(),
        locals: BTreeSet::new(),
    };

    if let Some(params) = &function.params {
        builder.seed_parameters(params);
    }
    if let Some(single) = &function.single_param {
        builder.record(single, RefType::Param, None);
        builder.locals.insert(node_text(single, &parsed.source).to_string());
    }

    if let Some(body) = &function.body {
        builder.walk(body);
    }

    let parameters: Vec<String> = builder
        .refs
        .iter()
        .filter(|r| r.ref_type == RefType::Param)
        .map(|r| r.name.clone())
        .collect();

    let mut variables = Vec::new();
    for var_ref in &builder.refs {
        if var_ref.ref_type.is_definition() && !variables.contains(&var_ref.name) {
            variables.push(var_ref.name.clone());
        }
    }

    let edges = builder.link_edges();
    let info = DfgInfo {
        function_name: function.name.clone(),
        file_path: parsed.path.clone(),
        refs: builder.refs,
        edges,
        variables,
        parameters,
        returns: builder.returns,
        reaching_defs: Default::default(),
        live_vars: Default::default(),
    };
    debug_assert!(info.verify().is_ok(), "dfg invariant violation");
    info
}

struct DfgBuilder<'a> {
    source: &'a str,
    scope: String,
    builtins: &'a BTreeSet<String>,
    refs: Vec<VarRef>,
    returns: Vec<String>,
    /// Names bound in this function: parameters and definitions. Used for
    /// capture detection in nested functions.
    locals: BTreeSet<String>,
}

impl<'a> DfgBuilder<'a> {
    fn record(&mut self, node: &Node, ref_type: RefType, expression: Option<String>) {
        self.refs.push(VarRef {
            name: node_text(node, self.source).to_string(),
            ref_type,
            line: node_line(node),
            column: node_column(node),
            scope: self.scope.clone(),
            is_in_closure: false,
            expression,
        });
    }

    fn seed_parameters(&mut self, params: &Node) {
        let mut names = Vec::new();
        collect_binding_identifiers(params, self.source, &mut names);
        for (node, name) in names {
            self.refs.push(VarRef {
                name: name.clone(),
                ref_type: RefType::Param,
                line: node_line(&node),
                column: node_column(&node),
                scope: self.scope.clone(),
                is_in_closure: false,
                expression: None,
            });
            self.locals.insert(name);
        }
    }

    fn walk(&mut self, node: &Node) {
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = node.walk();
                for declarator in node.children(&mut cursor) {
                    if declarator.kind() == "variable_declarator" {
                        self.walk_declarator(&declarator);
                    }
                }
                return;
            }
            "for_in_statement" | "for_of_statement" => {
                // The loop binding is a definition, the iterated value a use.
                if let Some(left) = node.child_by_field_name("left") {
                    let mut names = Vec::new();
                    collect_binding_identifiers(&left, self.source, &mut names);
                    for (id_node, name) in names {
                        self.record(&id_node, RefType::Def, None);
                        self.locals.insert(name);
                    }
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.walk(&right);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk(&body);
                }
                return;
            }
            "assignment_expression" => {
                let expression = Some(node_text(node, self.source).to_string());
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        self.record(&left, RefType::Def, expression);
                        self.locals.insert(node_text(&left, self.source).to_string());
                    } else {
                        // Member/pattern targets are reads of their parts.
                        self.walk(&left);
                    }
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.walk(&right);
                }
                return;
            }
            "augmented_assignment_expression" => {
                let expression = Some(node_text(node, self.source).to_string());
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        self.record(&left, RefType::Update, expression);
                        self.locals.insert(node_text(&left, self.source).to_string());
                    } else {
                        self.walk(&left);
                    }
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.walk(&right);
                }
                return;
            }
            "update_expression" => {
                if let Some(argument) = node.child_by_field_name("argument") {
                    if argument.kind() == "identifier" {
                        let expression = Some(node_text(node, self.source).to_string());
                        self.record(&argument, RefType::Update, expression);
                    }
                }
                return;
            }
            "return_statement" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.is_named() {
                        if child.kind() == "identifier" {
                            let name = node_text(&child, self.source).to_string();
                            if !self.returns.contains(&name) {
                                self.returns.push(name);
                            }
                        }
                        self.walk(&child);
                    }
                }
                return;
            }
            "arrow_function" | "function_expression" | "function" | "function_declaration"
            | "generator_function_declaration" => {
                self.capture_free_variables(node);
                return;
            }
            "call_expression" => {
                // The callee name is a call, not a variable read.
                if let Some(function) = node.child_by_field_name("function") {
                    match function.kind() {
                        "identifier" => {}
                        "member_expression" => {
                            if let Some(object) = function.child_by_field_name("object") {
                                self.walk(&object);
                            }
                        }
                        _ => self.walk(&function),
                    }
                }
                if let Some(arguments) = node.child_by_field_name("arguments") {
                    self.walk(&arguments);
                }
                return;
            }
            "member_expression" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.walk(&object);
                }
                return;
            }
            "identifier" | "shorthand_property_identifier" => {
                let name = node_text(node, self.source);
                if !self.builtins.contains(name) {
                    self.record(node, RefType::Use, None);
                }
                return;
            }
            "property_identifier" | "comment" | "string" => return,
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(&child);
        }
    }

    fn walk_declarator(&mut self, declarator: &Node) {
        let expression = Some(node_text(declarator, self.source).to_string());
        if let Some(name) = declarator.child_by_field_name("name") {
            let mut names = Vec::new();
            collect_binding_identifiers(&name, self.source, &mut names);
            for (id_node, bound) in names {
                self.refs.push(VarRef {
                    name: bound.clone(),
                    ref_type: RefType::Def,
                    line: node_line(&id_node),
                    column: node_column(&id_node),
                    scope: self.scope.clone(),
                    is_in_closure: false,
                    expression: expression.clone(),
                });
                self.locals.insert(bound);
            }
        }
        if let Some(value) = declarator.child_by_field_name("value") {
            self.walk(&value);
        }
    }

    /// Scan a nested function for free identifiers. Those bound in the
    /// enclosing scope become capture refs; the walker does not descend
    /// further for ordinary bookkeeping.
    fn capture_free_variables(&mut self, function: &Node) {
        let mut nested_locals = BTreeSet::new();
        if let Some(params) = function.child_by_field_name("parameters") {
            let mut names = Vec::new();
            collect_binding_identifiers(&params, self.source, &mut names);
            nested_locals.extend(names.into_iter().map(|(_, n)| n));
        }
        if let Some(single) = function.child_by_field_name("parameter") {
            nested_locals.insert(node_text(&single, self.source).to_string());
        }

        let Some(body) = function.child_by_field_name("body") else {
            return;
        };
        collect_nested_definitions(&body, self.source, &mut nested_locals);

        let mut free: Vec<(Node, String)> = Vec::new();
        collect_free_uses(&body, self.source, &nested_locals, &mut free);

        let mut seen = BTreeSet::new();
        for (id_node, name) in free {
            if self.builtins.contains(&name) || !self.locals.contains(&name) {
                continue;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            self.refs.push(VarRef {
                name,
                ref_type: RefType::Capture,
                line: node_line(&id_node),
                column: node_column(&id_node),
                scope: self.scope.clone(),
                is_in_closure: true,
                expression: None,
            });
        }
    }

    /// Connect every usage to the definitions on earlier lines; a
    /// definition strictly between them marks the edge may-reach.
    fn link_edges(&self) -> Vec<DefUseEdge> {
        let mut edges = Vec::new();
        for use_ref in self.refs.iter().filter(|r| r.ref_type.is_usage()) {
            let defs: Vec<&VarRef> = self
                .refs
                .iter()
                .filter(|d| {
                    d.ref_type.is_definition() && d.name == use_ref.name && d.line < use_ref.line
                })
                .collect();
            for def in &defs {
                let has_intervening = defs
                    .iter()
                    .any(|other| other.line > def.line && other.line < use_ref.line);
                edges.push(DefUseEdge {
                    variable: use_ref.name.clone(),
                    def: (*def).clone(),
                    use_ref: use_ref.clone(),
                    is_may_reach: has_intervening,
                    has_intervening_def: has_intervening,
                });
            }
        }
        edges
    }
}

/// `(node, name)` pairs for every identifier a binding pattern introduces.
/// Type annotations and default-value expressions bind nothing and are not
/// descended into.
fn collect_binding_identifiers<'t>(
    node: &Node<'t>,
    source: &str,
    out: &mut Vec<(Node<'t>, String)>,
) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            out.push((*node, node_text(node, source).to_string()));
            return;
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_binding_identifiers(&value, source, out);
            }
            return;
        }
        "required_parameter" | "optional_parameter" => {
            if let Some(pattern) = node.child_by_field_name("pattern") {
                collect_binding_identifiers(&pattern, source, out);
            }
            return;
        }
        "assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_binding_identifiers(&left, source, out);
            }
            return;
        }
        "type_annotation" => return,
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_binding_identifiers(&child, source, out);
    }
}

/// Names a nested function declares locally. Undeclared assignment targets
/// stay free: they write the enclosing scope's variable.
fn collect_nested_definitions(node: &Node, source: &str, out: &mut BTreeSet<String>) {
    if node.kind() == "variable_declarator" {
        if let Some(name) = node.child_by_field_name("name") {
            let mut names = Vec::new();
            collect_binding_identifiers(&name, source, &mut names);
            out.extend(names.into_iter().map(|(_, n)| n));
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_nested_definitions(&child, source, out);
    }
}

/// Identifier reads inside a nested function that are not bound locally.
fn collect_free_uses<'t>(
    node: &Node<'t>,
    source: &str,
    locals: &BTreeSet<String>,
    out: &mut Vec<(Node<'t>, String)>,
) {
    match node.kind() {
        "identifier" => {
            let name = node_text(node, source).to_string();
            if !locals.contains(&name) {
                out.push((*node, name));
            }
            return;
        }
        "property_identifier" | "comment" | "string" | "type_annotation" => return,
        "member_expression" => {
            if let Some(object) = node.child_by_field_name("object") {
                collect_free_uses(&object, source, locals, out);
            }
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_free_uses(&child, source, locals, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use crate::parsers::parse_source;
    use std::path::Path;

    fn dfg(source: &str, name: &str) -> DfgInfo {
        let parsed =
            parse_source(source, Path::new("test.ts"), Language::TypeScript).unwrap();
        build_dfg(&parsed, name).unwrap().expect("function not found")
    }

    #[test]
    fn test_parameters_seeded() {
        let info = dfg(
            "function add(a: number, b: number): number { return a + b; }",
            "add",
        );
        assert_eq!(info.parameters, vec!["a", "b"]);
        assert!(info.variables.contains(&"a".to_string()));
        assert!(info.variables.contains(&"b".to_string()));
        assert!(!info.variables.contains(&"Math".to_string()));
    }

    #[test]
    fn test_builtins_never_used() {
        let info = dfg(
            "function area(r: number) { return Math.floor(Math.PI * r * r); }",
            "area",
        );
        assert!(info.refs.iter().all(|r| r.name != "Math"));
        assert!(info
            .refs
            .iter()
            .any(|r| r.name == "r" && r.ref_type == RefType::Use));
    }

    #[test]
    fn test_def_use_chain_with_intervening_update() {
        let info = dfg(
            r#"
function sum(a: number[]) {
    let t = 0;
    for (const n of a) {
        t += n;
    }
    return t;
}
"#,
            "sum",
        );
        assert!(info.variables.contains(&"t".to_string()));
        assert!(info.variables.contains(&"n".to_string()));

        // The use at `return t` sees the original def through the update.
        let shadowed = info.edges.iter().find(|e| {
            e.variable == "t"
                && e.def.ref_type == RefType::Def
                && e.use_ref.line == 7
        });
        let edge = shadowed.expect("def-use edge for t missing");
        assert!(edge.has_intervening_def);
        assert!(edge.is_may_reach);

        // The update itself reads the original def cleanly.
        let direct = info
            .edges
            .iter()
            .find(|e| e.variable == "t" && e.use_ref.ref_type == RefType::Update)
            .unwrap();
        assert!(!direct.has_intervening_def);
        assert!(info.verify().is_ok());
    }

    #[test]
    fn test_returns_record_identifiers() {
        let info = dfg(
            "function pick(x: number) {\n    const y = x + 1;\n    return y;\n}",
            "pick",
        );
        assert_eq!(info.returns, vec!["y"]);
    }

    #[test]
    fn test_plain_assignment_is_def() {
        let info = dfg(
            "function f() {\n    let x = 1;\n    x = 2;\n    return x;\n}",
            "f",
        );
        let defs: Vec<&VarRef> = info
            .refs
            .iter()
            .filter(|r| r.name == "x" && r.ref_type == RefType::Def)
            .collect();
        assert_eq!(defs.len(), 2);

        // `return x` reaches both defs; the first is shadowed.
        let edges = info.edges_of("x");
        let to_return: Vec<_> = edges.iter().filter(|e| e.use_ref.line == 4).collect();
        assert_eq!(to_return.len(), 2);
        assert!(to_return.iter().any(|e| e.has_intervening_def));
        assert!(to_return.iter().any(|e| !e.has_intervening_def));
    }

    #[test]
    fn test_update_expression_is_update() {
        let info = dfg("function f(n: number) {\n    n++;\n    return n;\n}", "f");
        assert!(info
            .refs
            .iter()
            .any(|r| r.name == "n" && r.ref_type == RefType::Update));
    }

    #[test]
    fn test_nested_function_captures() {
        let info = dfg(
            r#"
function counter(start: number) {
    let count = start;
    const bump = () => {
        count = count + 1;
    };
    return count;
}
"#,
            "counter",
        );
        let capture = info
            .refs
            .iter()
            .find(|r| r.ref_type == RefType::Capture)
            .expect("no capture ref");
        assert_eq!(capture.name, "count");
        assert!(capture.is_in_closure);
    }

    #[test]
    fn test_nested_locals_not_captured() {
        let info = dfg(
            r#"
function outer(xs: number[]) {
    const doubled = xs.map((x) => x * 2);
    return doubled;
}
"#,
            "outer",
        );
        assert!(info.refs.iter().all(|r| r.ref_type != RefType::Capture));
    }

    #[test]
    fn test_destructured_declaration_defines_each_name() {
        let info = dfg(
            "function f(pair: [number, number]) {\n    const [lo, hi] = pair;\n    return lo + hi;\n}",
            "f",
        );
        assert!(info.variables.contains(&"lo".to_string()));
        assert!(info.variables.contains(&"hi".to_string()));
    }

    #[test]
    fn test_member_property_not_a_use() {
        let info = dfg(
            "function f(obj: any) {\n    return obj.field;\n}",
            "f",
        );
        assert!(info.refs.iter().all(|r| r.name != "field"));
        assert!(info.refs.iter().any(|r| r.name == "obj"));
    }
}
