//! Function and parameter extraction for the structure layer.

use crate::parsers::{
    annotation_text, docstring_before, has_child_token, node_line, node_span, node_text,
};
use crate::structure::types::{FunctionInfo, FunctionKind, ParameterInfo, Visibility};
use tree_sitter::Node;

/// Parse a `function_declaration` / `generator_function_declaration`.
pub fn parse_function_declaration(node: &Node, source: &str) -> Option<FunctionInfo> {
    let name_node = node.child_by_field_name("name")?;
    let mut func = FunctionInfo::new(
        node_text(&name_node, source),
        FunctionKind::Declaration,
        node_line(node),
        node_span(node),
    );
    func.is_async = has_child_token(node, "async");
    func.is_generator = node.kind() == "generator_function_declaration";
    if let Some(params) = node.child_by_field_name("parameters") {
        func.params = parse_parameters(&params, source);
    }
    if let Some(ret) = node.child_by_field_name("return_type") {
        func.return_type = Some(annotation_text(&ret, source));
    }
    func.docstring = docstring_before(node, source);
    Some(func)
}

/// Parse an arrow function or function expression bound to a variable
/// declarator, attaching it to the variable's name so its parameters and
/// body stay analysable.
pub fn function_from_declarator(declarator: &Node, source: &str) -> Option<FunctionInfo> {
    let name_node = declarator.child_by_field_name("name")?;
    if name_node.kind() != "identifier" {
        return None;
    }
    let value = declarator.child_by_field_name("value")?;

    let kind = match value.kind() {
        "arrow_function" => FunctionKind::Arrow,
        "function_expression" | "function" => FunctionKind::Expression,
        _ => return None,
    };

    let mut func = FunctionInfo::new(
        node_text(&name_node, source),
        kind,
        node_line(declarator),
        node_span(declarator),
    );
    func.is_async = has_child_token(&value, "async");
    func.is_generator = has_child_token(&value, "*");

    if let Some(params) = value.child_by_field_name("parameters") {
        func.params = parse_parameters(&params, source);
    } else if let Some(single) = value.child_by_field_name("parameter") {
        // `x => ...` form: one bare identifier, no parens.
        func.params = vec![ParameterInfo::named(node_text(&single, source))];
    }
    if let Some(ret) = value.child_by_field_name("return_type") {
        func.return_type = Some(annotation_text(&ret, source));
    }

    let statement = declarator.parent();
    func.docstring = statement
        .as_ref()
        .and_then(|s| docstring_before(s, source));
    Some(func)
}

/// Parse a `method_definition` inside a class body.
pub fn parse_method(node: &Node, source: &str) -> Option<FunctionInfo> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, source).to_string();

    let mut func = FunctionInfo::new(&name, FunctionKind::Method, node_line(node), node_span(node));
    func.is_async = has_child_token(node, "async");
    func.is_generator = has_child_token(node, "*");
    func.is_static = has_child_token(node, "static");
    func.visibility = parse_visibility(node, source);
    if name_node.kind() == "private_property_identifier" {
        func.visibility = Visibility::Private;
    }

    if let Some(params) = node.child_by_field_name("parameters") {
        func.params = parse_parameters(&params, source);
    }
    if let Some(ret) = node.child_by_field_name("return_type") {
        func.return_type = Some(annotation_text(&ret, source));
    }
    func.docstring = docstring_before(node, source);
    Some(func)
}

/// Read an `accessibility_modifier` child (`public` / `private` / `protected`).
pub fn parse_visibility(node: &Node, source: &str) -> Visibility {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "accessibility_modifier" {
            return match node_text(&child, source) {
                "private" => Visibility::Private,
                "protected" => Visibility::Protected,
                _ => Visibility::Public,
            };
        }
    }
    Visibility::None
}

/// Parse a `formal_parameters` node into the ordered parameter list.
///
/// Destructured patterns contribute one entry per bound identifier.
pub fn parse_parameters(node: &Node, source: &str) -> Vec<ParameterInfo> {
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" => params.push(ParameterInfo::named(node_text(&child, source))),
            "required_parameter" | "optional_parameter" | "rest_parameter" => {
                parse_typed_parameter(&child, source, &mut params);
            }
            "assignment_pattern" => {
                // JS default value form: `x = 1`.
                if let Some(left) = child.child_by_field_name("left") {
                    let default = child
                        .child_by_field_name("right")
                        .map(|r| node_text(&r, source).to_string());
                    for mut param in pattern_parameters(&left, source) {
                        param.default_value = default.clone();
                        params.push(param);
                    }
                }
            }
            "rest_pattern" | "object_pattern" | "array_pattern" => {
                params.extend(pattern_parameters(&child, source));
            }
            _ => {}
        }
    }
    params
}

/// TS parameter node: `pattern` field plus optional type and initializer.
fn parse_typed_parameter(node: &Node, source: &str, out: &mut Vec<ParameterInfo>) {
    let Some(pattern) = node.child_by_field_name("pattern") else {
        return;
    };
    let param_type = node
        .child_by_field_name("type")
        .map(|t| annotation_text(&t, source));
    let default_value = node
        .child_by_field_name("value")
        .map(|v| node_text(&v, source).to_string());
    let is_optional = node.kind() == "optional_parameter";

    for mut param in pattern_parameters(&pattern, source) {
        if param.param_type.is_none() {
            param.param_type = param_type.clone();
        }
        param.default_value = param.default_value.take().or_else(|| default_value.clone());
        param.is_optional = param.is_optional || is_optional;
        out.push(param);
    }
}

/// Bound identifiers of a binding pattern, each as its own parameter.
fn pattern_parameters(pattern: &Node, source: &str) -> Vec<ParameterInfo> {
    match pattern.kind() {
        "identifier" | "this" => vec![ParameterInfo::named(node_text(pattern, source))],
        "rest_pattern" => {
            let mut inner = Vec::new();
            let mut cursor = pattern.walk();
            for child in pattern.children(&mut cursor) {
                inner.extend(pattern_parameters(&child, source));
            }
            for param in &mut inner {
                param.is_rest = true;
            }
            inner
        }
        "object_pattern" | "array_pattern" => {
            let mut names = Vec::new();
            collect_bound_identifiers(pattern, source, &mut names);
            names.into_iter().map(ParameterInfo::named).collect()
        }
        _ => Vec::new(),
    }
}

/// Walk a destructuring pattern collecting the names it binds. Property keys
/// of `{key: binding}` pairs are not bindings and are skipped.
fn collect_bound_identifiers(node: &Node, source: &str, out: &mut Vec<String>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            out.push(node_text(node, source).to_string());
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_bound_identifiers(&value, source, out);
            }
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_bound_identifiers(&child, source, out);
    }
}
