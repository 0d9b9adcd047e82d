//! Class, interface, and type-alias extraction for the structure layer.

use crate::parsers::{
    annotation_text, docstring_before, has_child_token, node_line, node_span, node_text,
};
use crate::structure::functions::{parse_method, parse_parameters, parse_visibility};
use crate::structure::types::{
    ClassInfo, FunctionInfo, FunctionKind, InterfaceInfo, PropertyInfo, TypeAliasInfo, Visibility,
};
use tree_sitter::Node;

/// Parse a `class_declaration` (or `abstract_class_declaration`).
pub fn parse_class(node: &Node, source: &str) -> Option<ClassInfo> {
    let name_node = node.child_by_field_name("name")?;

    let mut class = ClassInfo {
        name: node_text(&name_node, source).to_string(),
        bases: Vec::new(),
        implements: Vec::new(),
        methods: Vec::new(),
        properties: Vec::new(),
        is_abstract: node.kind() == "abstract_class_declaration"
            || has_child_token(node, "abstract"),
        is_exported: false,
        export_type: Default::default(),
        decorators: child_decorators(node, source),
        docstring: docstring_before(node, source),
        line: node_line(node),
        span: node_span(node),
    };

    parse_heritage(node, source, &mut class);

    if let Some(body) = node.child_by_field_name("body") {
        parse_class_body(&body, source, &mut class);
    }
    Some(class)
}

fn parse_heritage(node: &Node, source: &str, class: &mut ClassInfo) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "class_heritage" {
            continue;
        }
        let mut saw_clause = false;
        let mut heritage_cursor = child.walk();
        for clause in child.children(&mut heritage_cursor) {
            match clause.kind() {
                "extends_clause" => {
                    saw_clause = true;
                    let mut value_cursor = clause.walk();
                    for value in clause.children_by_field_name("value", &mut value_cursor) {
                        class.bases.push(node_text(&value, source).to_string());
                    }
                }
                "implements_clause" => {
                    saw_clause = true;
                    let mut impl_cursor = clause.walk();
                    for ty in clause.children(&mut impl_cursor) {
                        if ty.is_named() {
                            class.implements.push(node_text(&ty, source).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        // The JS grammar keeps the superclass as a bare expression child of
        // the heritage node.
        if !saw_clause {
            let mut bare = child.walk();
            for c in child.children(&mut bare) {
                if c.is_named() && c.kind() != "comment" {
                    class.bases.push(node_text(&c, source).to_string());
                }
            }
        }
    }
}

fn parse_class_body(body: &Node, source: &str, class: &mut ClassInfo) {
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        match member.kind() {
            "method_definition" => {
                if let Some(mut method) = parse_method(&member, source) {
                    method.decorators = child_decorators(&member, source);
                    class.methods.push(method);
                }
            }
            "public_field_definition" | "private_field_definition" | "field_definition" => {
                if let Some(property) = parse_property(&member, source) {
                    class.properties.push(property);
                }
            }
            _ => {}
        }
    }
}

fn parse_property(node: &Node, source: &str) -> Option<PropertyInfo> {
    let name_node = node.child_by_field_name("name")?;
    let mut visibility = parse_visibility(node, source);
    if name_node.kind() == "private_property_identifier" {
        visibility = Visibility::Private;
    }

    Some(PropertyInfo {
        name: node_text(&name_node, source).to_string(),
        property_type: node
            .child_by_field_name("type")
            .map(|t| annotation_text(&t, source)),
        default_value: node
            .child_by_field_name("value")
            .map(|v| node_text(&v, source).to_string()),
        visibility,
        is_static: has_child_token(node, "static"),
        is_readonly: has_child_token(node, "readonly"),
        is_optional: has_child_token(node, "?"),
        line: node_line(node),
    })
}

/// Decorators attached to a declaration. The grammar keeps them as leading
/// children of the decorated node; export-wrapped declarations carry them as
/// preceding siblings instead, so both positions are read.
fn child_decorators(node: &Node, source: &str) -> Vec<String> {
    let mut decorators: Vec<String> = {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .map(|c| node_text(&c, source).to_string())
            .collect()
    };

    let mut prev = node.prev_sibling();
    let mut leading = Vec::new();
    while let Some(sibling) = prev {
        if sibling.kind() != "decorator" {
            break;
        }
        leading.push(node_text(&sibling, source).to_string());
        prev = sibling.prev_sibling();
    }
    leading.reverse();
    leading.extend(decorators.drain(..));
    leading
}

/// Parse an `interface_declaration`, including method and property
/// signatures.
pub fn parse_interface(node: &Node, source: &str) -> Option<InterfaceInfo> {
    let name_node = node.child_by_field_name("name")?;

    let mut interface = InterfaceInfo {
        name: node_text(&name_node, source).to_string(),
        extends: Vec::new(),
        methods: Vec::new(),
        properties: Vec::new(),
        is_exported: false,
        docstring: docstring_before(node, source),
        line: node_line(node),
        span: node_span(node),
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "extends_type_clause" {
            let mut type_cursor = child.walk();
            for ty in child.children(&mut type_cursor) {
                if ty.is_named() {
                    interface.extends.push(node_text(&ty, source).to_string());
                }
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut body_cursor = body.walk();
        for member in body.children(&mut body_cursor) {
            match member.kind() {
                "method_signature" => {
                    if let Some(method) = parse_method_signature(&member, source) {
                        interface.methods.push(method);
                    }
                }
                "property_signature" => {
                    if let Some(property) = parse_property_signature(&member, source) {
                        interface.properties.push(property);
                    }
                }
                _ => {}
            }
        }
    }
    Some(interface)
}

fn parse_method_signature(node: &Node, source: &str) -> Option<FunctionInfo> {
    let name_node = node.child_by_field_name("name")?;
    let mut func = FunctionInfo::new(
        node_text(&name_node, source),
        FunctionKind::Method,
        node_line(node),
        node_span(node),
    );
    if let Some(params) = node.child_by_field_name("parameters") {
        func.params = parse_parameters(&params, source);
    }
    if let Some(ret) = node.child_by_field_name("return_type") {
        func.return_type = Some(annotation_text(&ret, source));
    }
    Some(func)
}

fn parse_property_signature(node: &Node, source: &str) -> Option<PropertyInfo> {
    let name_node = node.child_by_field_name("name")?;
    Some(PropertyInfo {
        name: node_text(&name_node, source).to_string(),
        property_type: node
            .child_by_field_name("type")
            .map(|t| annotation_text(&t, source)),
        default_value: None,
        visibility: Visibility::None,
        is_static: false,
        is_readonly: has_child_token(node, "readonly"),
        is_optional: has_child_token(node, "?"),
        line: node_line(node),
    })
}

/// Parse a `type_alias_declaration`; the definition is kept as raw text.
pub fn parse_type_alias(node: &Node, source: &str) -> Option<TypeAliasInfo> {
    let name_node = node.child_by_field_name("name")?;
    let value = node.child_by_field_name("value")?;
    Some(TypeAliasInfo {
        name: node_text(&name_node, source).to_string(),
        definition: node_text(&value, source).to_string(),
        is_exported: false,
        line: node_line(node),
    })
}
