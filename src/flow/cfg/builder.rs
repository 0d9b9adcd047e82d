//! Control-flow graph construction for one function body.
//!
//! An explicit builder value carries the block list, edge list, nesting
//! depth, and decision count; recursive descent passes and returns the
//! dangling-predecessor frontier, so no state hides between steps.

use crate::core::errors::Result;
use crate::flow::cfg::types::{cyclomatic, BlockType, CfgBlock, CfgEdge, CfgInfo, EdgeType};
use crate::flow::index::{FunctionIndex, IndexedFunction};
use crate::parsers::{node_span, node_text, ParsedFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// A dangling predecessor: the edge it will contribute once the next block
/// appears.
#[derive(Clone, Debug)]
struct Pending {
    from: usize,
    edge_type: EdgeType,
    condition: Option<String>,
}

type Frontier = Vec<Pending>;

fn pending(from: usize, edge_type: EdgeType, condition: Option<String>) -> Pending {
    Pending {
        from,
        edge_type,
        condition,
    }
}

/// Build the CFG for the named function in a parsed file. Returns `Ok(None)`
/// when the function cannot be located.
pub fn build_cfg(parsed: &ParsedFile, function_name: &str) -> Result<Option<CfgInfo>> {
    let index = FunctionIndex::build(parsed);
    let Some(function) = index.get(function_name) else {
        return Ok(None);
    };
    Ok(Some(build_for_indexed(parsed, function)))
}

/// Build the CFG for an already-located function.
pub fn build_for_indexed(parsed: &ParsedFile, function: &IndexedFunction<'_>) -> CfgInfo {
    CfgBuilder::new(&parsed.source, &parsed.path, &function.name).build(function)
}

struct CfgBuilder<'a> {
    source: &'a str,
    file_path: PathBuf,
    function_name: String,
    blocks: Vec<CfgBlock>,
    edges: Vec<CfgEdge>,
    nesting: usize,
    max_nesting: usize,
    decision_points: usize,
    return_blocks: Vec<usize>,
    throw_blocks: Vec<usize>,
    nested: BTreeMap<String, CfgInfo>,
    /// Overrides the type of the next sequential block (loop/try regions).
    next_body_type: Option<BlockType>,
}

impl<'a> CfgBuilder<'a> {
    fn new(source: &'a str, file_path: &Path, function_name: &str) -> Self {
        Self {
            source,
            file_path: file_path.to_path_buf(),
            function_name: function_name.to_string(),
            blocks: Vec::new(),
            edges: Vec::new(),
            nesting: 0,
            max_nesting: 0,
            decision_points: 0,
            return_blocks: Vec::new(),
            throw_blocks: Vec::new(),
            nested: BTreeMap::new(),
            next_body_type: None,
        }
    }

    fn build(mut self, function: &IndexedFunction<'_>) -> CfgInfo {
        let entry = self.new_block(BlockType::Entry, &function.node, Vec::new());
        let mut frontier = vec![pending(entry, EdgeType::Unconditional, None)];

        if let Some(body) = &function.body {
            if body.kind() == "statement_block" {
                frontier = self.process_block(body, frontier);
            } else {
                // Arrow shorthand: the expression is the returned value.
                let id = self.new_block(
                    BlockType::Return,
                    body,
                    vec![node_text(body, self.source).to_string()],
                );
                self.connect(&frontier, id);
                self.return_blocks.push(id);
                frontier = Vec::new();
            }
        }

        // The synthesised exit absorbs every dangling predecessor; return
        // and throw blocks flow only here.
        let exit = self.new_block(BlockType::Exit, &function.node, Vec::new());
        self.connect(&frontier, exit);
        for id in self.return_blocks.clone() {
            self.push_edge(id, exit, EdgeType::Return, None, false);
        }
        for id in self.throw_blocks.clone() {
            self.push_edge(id, exit, EdgeType::Throw, None, false);
        }

        let mut exit_blocks: Vec<usize> = self
            .return_blocks
            .iter()
            .chain(self.throw_blocks.iter())
            .copied()
            .collect();
        exit_blocks.push(exit);
        exit_blocks.sort_unstable();

        let info = CfgInfo {
            function_name: self.function_name,
            file_path: self.file_path,
            cyclomatic_complexity: cyclomatic(self.edges.len(), self.blocks.len()),
            max_nesting_depth: self.max_nesting,
            decision_points: self.decision_points,
            entry_block: entry,
            exit_blocks,
            blocks: self.blocks,
            edges: self.edges,
            nested_functions: self.nested,
        };
        debug_assert!(info.verify().is_ok(), "cfg invariant violation");
        info
    }

    fn new_block(&mut self, block_type: BlockType, node: &Node, statements: Vec<String>) -> usize {
        let block_type = match (block_type, self.next_body_type.take()) {
            (BlockType::Body, Some(replacement)) => replacement,
            (requested, _) => requested,
        };
        let id = self.blocks.len();
        let span = node_span(node);
        let (defines, uses, calls) = match block_type {
            BlockType::Entry | BlockType::Exit => (Vec::new(), Vec::new(), Vec::new()),
            _ => collect_block_vars(node, self.source),
        };
        self.blocks.push(CfgBlock {
            id,
            block_type,
            start_line: span.start_line,
            end_line: span.end_line,
            span,
            statements,
            calls,
            defines,
            uses,
        });
        id
    }

    fn push_edge(
        &mut self,
        from: usize,
        to: usize,
        edge_type: EdgeType,
        condition: Option<String>,
        is_back_edge: bool,
    ) {
        self.edges.push(CfgEdge {
            from,
            to,
            edge_type,
            condition,
            is_back_edge,
        });
    }

    fn connect(&mut self, frontier: &[Pending], to: usize) {
        for p in frontier {
            self.push_edge(p.from, to, p.edge_type, p.condition.clone(), false);
        }
    }

    fn enter_nested(&mut self) {
        self.nesting += 1;
        self.max_nesting = self.max_nesting.max(self.nesting);
    }

    fn leave_nested(&mut self) {
        self.nesting -= 1;
    }

    fn process_block(&mut self, block: &Node, mut frontier: Frontier) -> Frontier {
        let mut cursor = block.walk();
        for child in block.children(&mut cursor) {
            if !child.is_named() || child.kind() == "comment" {
                continue;
            }
            frontier = self.process_statement(&child, frontier);
        }
        frontier
    }

    fn process_statement(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        match node.kind() {
            "statement_block" => self.process_block(node, frontier),
            "if_statement" => self.process_if(node, frontier),
            "for_statement" => self.process_for(node, frontier),
            "for_in_statement" | "for_of_statement" => self.process_for_in(node, frontier),
            "while_statement" => self.process_while(node, frontier),
            "do_statement" => self.process_do_while(node, frontier),
            "switch_statement" => self.process_switch(node, frontier),
            "try_statement" => self.process_try(node, frontier),
            "return_statement" => {
                let id = self.new_block(BlockType::Return, node, vec![self.text_of(node)]);
                self.connect(&frontier, id);
                self.return_blocks.push(id);
                Vec::new()
            }
            "throw_statement" => {
                let id = self.new_block(BlockType::Throw, node, vec![self.text_of(node)]);
                self.connect(&frontier, id);
                self.throw_blocks.push(id);
                Vec::new()
            }
            "break_statement" | "continue_statement" => {
                // Control leaves the containing construct; the block dangles.
                let id = self.new_block(BlockType::Body, node, vec![self.text_of(node)]);
                self.connect(&frontier, id);
                Vec::new()
            }
            "function_declaration" | "generator_function_declaration" => {
                self.record_nested(node);
                frontier
            }
            "lexical_declaration" | "variable_declaration" => {
                self.record_nested_declarators(node);
                self.sequential(node, frontier)
            }
            "empty_statement" => frontier,
            _ => self.sequential(node, frontier),
        }
    }

    fn sequential(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let id = self.new_block(BlockType::Body, node, vec![self.text_of(node)]);
        self.connect(&frontier, id);
        vec![pending(id, EdgeType::Unconditional, None)]
    }

    fn process_if(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let condition = node.child_by_field_name("condition");
        let condition_text = condition.map(|c| self.condition_text(&c));
        let branch_node = condition.unwrap_or(*node);
        let branch = self.new_block(
            BlockType::Branch,
            &branch_node,
            vec![condition_text.clone().unwrap_or_default()],
        );
        self.connect(&frontier, branch);
        self.decision_points += 1;

        self.enter_nested();
        let mut out = match node.child_by_field_name("consequence") {
            Some(consequence) => self.process_statement(
                &consequence,
                vec![pending(branch, EdgeType::True, condition_text.clone())],
            ),
            None => Vec::new(),
        };
        self.leave_nested();

        let alternative = node
            .child_by_field_name("alternative")
            .and_then(|e| first_named_child(&e));
        match alternative {
            Some(alt) => {
                self.enter_nested();
                let alt_out = self.process_statement(
                    &alt,
                    vec![pending(branch, EdgeType::False, condition_text)],
                );
                self.leave_nested();
                out.extend(alt_out);
            }
            None => out.push(pending(branch, EdgeType::False, condition_text)),
        }
        out
    }

    fn process_for(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let mut statements = Vec::new();
        if let Some(init) = node.child_by_field_name("initializer") {
            statements.push(self.text_of(&init));
        }
        let condition_text = node
            .child_by_field_name("condition")
            .map(|c| self.condition_text(&c));
        if let Some(text) = &condition_text {
            if !text.is_empty() {
                statements.push(text.clone());
            }
        }
        self.loop_shape(node, frontier, statements, condition_text)
    }

    fn process_for_in(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let left = node.child_by_field_name("left").map(|n| self.text_of(&n));
        let right = node.child_by_field_name("right").map(|n| self.text_of(&n));
        let header_text = match (&left, &right) {
            (Some(l), Some(r)) => format!("{l} of {r}"),
            _ => self.text_of(node),
        };
        self.loop_shape(node, frontier, vec![header_text], right)
    }

    fn process_while(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let condition_text = node
            .child_by_field_name("condition")
            .map(|c| self.condition_text(&c));
        let statements = condition_text.clone().map(|t| vec![t]).unwrap_or_default();
        self.loop_shape(node, frontier, statements, condition_text)
    }

    /// Shared pre-test loop shape: header, body with a true edge, back
    /// edges from every body exit, header false edge as the loop exit.
    fn loop_shape(
        &mut self,
        node: &Node,
        frontier: Frontier,
        header_statements: Vec<String>,
        condition_text: Option<String>,
    ) -> Frontier {
        let header_node = node
            .child_by_field_name("condition")
            .or_else(|| node.child_by_field_name("right"))
            .unwrap_or(*node);
        let header = self.new_block(BlockType::LoopHeader, &header_node, header_statements);
        self.connect(&frontier, header);
        self.decision_points += 1;

        self.enter_nested();
        self.next_body_type = Some(BlockType::LoopBody);
        let body_out = match node.child_by_field_name("body") {
            Some(body) => self.process_statement(
                &body,
                vec![pending(header, EdgeType::True, condition_text.clone())],
            ),
            None => Vec::new(),
        };
        self.next_body_type = None;
        self.leave_nested();

        for p in &body_out {
            self.push_edge(p.from, header, EdgeType::BackEdge, None, true);
        }
        vec![pending(header, EdgeType::False, condition_text)]
    }

    fn process_do_while(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let first_body_block = self.blocks.len();
        self.enter_nested();
        self.next_body_type = Some(BlockType::LoopBody);
        let body_out = match node.child_by_field_name("body") {
            Some(body) => self.process_statement(&body, frontier),
            None => frontier,
        };
        self.next_body_type = None;
        self.leave_nested();

        let condition_text = node
            .child_by_field_name("condition")
            .map(|c| self.condition_text(&c));
        let header_node = node.child_by_field_name("condition").unwrap_or(*node);
        let header = self.new_block(
            BlockType::LoopHeader,
            &header_node,
            condition_text.clone().map(|t| vec![t]).unwrap_or_default(),
        );
        self.decision_points += 1;
        self.connect(&body_out, header);
        if first_body_block < header {
            self.push_edge(header, first_body_block, EdgeType::BackEdge, None, true);
        }
        vec![pending(header, EdgeType::False, condition_text)]
    }

    fn process_switch(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        let scrutinee = node.child_by_field_name("value");
        let scrutinee_text = scrutinee.map(|v| self.condition_text(&v));
        let branch_node = scrutinee.unwrap_or(*node);
        let branch = self.new_block(
            BlockType::Branch,
            &branch_node,
            vec![scrutinee_text.unwrap_or_default()],
        );
        self.connect(&frontier, branch);

        let Some(body) = node.child_by_field_name("body") else {
            return vec![pending(branch, EdgeType::Default, None)];
        };

        self.enter_nested();
        let mut fallthrough: Frontier = Vec::new();
        let mut saw_default = false;

        let mut cursor = body.walk();
        for case in body.children(&mut cursor) {
            let (entry_type, value_text) = match case.kind() {
                "switch_case" => (
                    EdgeType::Case,
                    case.child_by_field_name("value").map(|v| self.text_of(&v)),
                ),
                "switch_default" => {
                    saw_default = true;
                    (EdgeType::Default, None)
                }
                _ => continue,
            };
            self.decision_points += 1;

            let mut entry: Frontier = vec![pending(branch, entry_type, value_text)];
            // The previous case falls through when it did not break.
            entry.extend(
                fallthrough
                    .drain(..)
                    .map(|p| pending(p.from, EdgeType::Fallthrough, None)),
            );

            let value_node = case.child_by_field_name("value");
            let mut case_out = entry;
            let mut case_cursor = case.walk();
            for statement in case.children(&mut case_cursor) {
                if !statement.is_named() || statement.kind() == "comment" {
                    continue;
                }
                if value_node.is_some_and(|v| v == statement) {
                    continue;
                }
                case_out = self.process_statement(&statement, case_out);
            }
            fallthrough = case_out;
        }
        self.leave_nested();

        let mut out = fallthrough;
        if !saw_default {
            out.push(pending(branch, EdgeType::Default, None));
        }
        out
    }

    fn process_try(&mut self, node: &Node, frontier: Frontier) -> Frontier {
        self.enter_nested();
        let first_try_block = self.blocks.len();
        self.next_body_type = Some(BlockType::Try);
        let try_out = match node.child_by_field_name("body") {
            Some(body) => self.process_block(&body, frontier),
            None => frontier,
        };
        self.next_body_type = None;

        // The catch body is reached via a throw edge from the try region.
        let mut normal_exits = try_out;
        if let Some(handler) = node.child_by_field_name("handler") {
            if let Some(catch_body) = handler.child_by_field_name("body") {
                if first_try_block < self.blocks.len() {
                    self.next_body_type = Some(BlockType::Catch);
                    let catch_out = self.process_block(
                        &catch_body,
                        vec![pending(first_try_block, EdgeType::Throw, None)],
                    );
                    self.next_body_type = None;
                    normal_exits.extend(catch_out);
                }
            }
        }

        let out = if let Some(finalizer) = node.child_by_field_name("finalizer") {
            let finalizer_body = match finalizer.child_by_field_name("body") {
                Some(body) => Some(body),
                None => {
                    let mut cursor = finalizer.walk();
                    let result = finalizer
                        .children(&mut cursor)
                        .find(|c| c.kind() == "statement_block");
                    result
                }
            };
            match finalizer_body {
                Some(finally_body) => {
                    self.next_body_type = Some(BlockType::Finally);
                    let finally_out = self.process_block(&finally_body, normal_exits);
                    self.next_body_type = None;
                    finally_out
                }
                None => normal_exits,
            }
        } else {
            normal_exits
        };
        self.leave_nested();
        out
    }

    /// Build and file a nested CFG for a function declared inside this body.
    fn record_nested(&mut self, node: &Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(&name_node, self.source).to_string();
        let nested = IndexedFunction {
            name: name.clone(),
            class: None,
            body: node.child_by_field_name("body"),
            params: node.child_by_field_name("parameters"),
            single_param: node.child_by_field_name("parameter"),
            span: node_span(node),
            node: *node,
        };
        let info = CfgBuilder::new(self.source, &self.file_path, &name).build(&nested);
        self.nested.insert(name, info);
    }

    fn record_nested_declarators(&mut self, node: &Node) {
        let mut cursor = node.walk();
        for declarator in node.children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(value) = declarator.child_by_field_name("value") else {
                continue;
            };
            if !matches!(
                value.kind(),
                "arrow_function" | "function_expression" | "function"
            ) {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = node_text(&name_node, self.source).to_string();
            let nested = IndexedFunction {
                name: name.clone(),
                class: None,
                body: value.child_by_field_name("body"),
                params: value.child_by_field_name("parameters"),
                single_param: value.child_by_field_name("parameter"),
                span: node_span(&value),
                node: value,
            };
            let info = CfgBuilder::new(self.source, &self.file_path, &name).build(&nested);
            self.nested.insert(name, info);
        }
    }

    fn text_of(&self, node: &Node) -> String {
        node_text(node, self.source).trim().to_string()
    }

    /// Condition text with the outer parentheses stripped.
    fn condition_text(&self, node: &Node) -> String {
        if node.kind() == "parenthesized_expression" {
            if let Some(inner) = first_named_child(node) {
                return self.text_of(&inner);
            }
        }
        self.text_of(node)
    }
}

fn first_named_child<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor)
        .find(|c| c.is_named() && c.kind() != "comment");
    result
}

/// Identifiers written, read, and called within one statement or condition.
/// Nested callables are skipped; they have their own graphs.
fn collect_block_vars(node: &Node, source: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut defines = Vec::new();
    let mut uses = Vec::new();
    let mut calls = Vec::new();
    collect_vars_walk(node, source, &mut defines, &mut uses, &mut calls);
    uses.retain(|u| !defines.contains(u));
    (defines, uses, calls)
}

fn collect_vars_walk(
    node: &Node,
    source: &str,
    defines: &mut Vec<String>,
    uses: &mut Vec<String>,
    calls: &mut Vec<String>,
) {
    match node.kind() {
        "arrow_function" | "function_expression" | "function" | "function_declaration" => return,
        "variable_declarator" => {
            if let Some(name) = node.child_by_field_name("name") {
                collect_pattern_names(&name, source, defines);
            }
            if let Some(value) = node.child_by_field_name("value") {
                collect_vars_walk(&value, source, defines, uses, calls);
            }
            return;
        }
        "assignment_expression" | "augmented_assignment_expression" => {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    push_unique(defines, node_text(&left, source));
                } else {
                    collect_vars_walk(&left, source, defines, uses, calls);
                }
            }
            if let Some(right) = node.child_by_field_name("right") {
                collect_vars_walk(&right, source, defines, uses, calls);
            }
            return;
        }
        "update_expression" => {
            if let Some(argument) = node.child_by_field_name("argument") {
                if argument.kind() == "identifier" {
                    push_unique(defines, node_text(&argument, source));
                }
            }
            return;
        }
        "call_expression" => {
            if let Some(function) = node.child_by_field_name("function") {
                match function.kind() {
                    "identifier" => push_unique(calls, node_text(&function, source)),
                    "member_expression" => {
                        if let Some(property) = function.child_by_field_name("property") {
                            push_unique(calls, node_text(&property, source));
                        }
                        if let Some(object) = function.child_by_field_name("object") {
                            collect_vars_walk(&object, source, defines, uses, calls);
                        }
                    }
                    _ => collect_vars_walk(&function, source, defines, uses, calls),
                }
            }
            if let Some(arguments) = node.child_by_field_name("arguments") {
                collect_vars_walk(&arguments, source, defines, uses, calls);
            }
            return;
        }
        "member_expression" => {
            // Property names are not variables; only the receiver is read.
            if let Some(object) = node.child_by_field_name("object") {
                collect_vars_walk(&object, source, defines, uses, calls);
            }
            return;
        }
        "identifier" => {
            push_unique(uses, node_text(node, source));
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_vars_walk(&child, source, defines, uses, calls);
    }
}

fn collect_pattern_names(node: &Node, source: &str, out: &mut Vec<String>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            push_unique(out, node_text(node, source));
            return;
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_pattern_names(&value, source, out);
            }
            return;
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_pattern_names(&child, source, out);
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use crate::parsers::parse_source;

    fn cfg(source: &str, name: &str) -> CfgInfo {
        let parsed =
            parse_source(source, Path::new("test.ts"), Language::TypeScript).unwrap();
        build_cfg(&parsed, name).unwrap().expect("function not found")
    }

    fn count_type(info: &CfgInfo, block_type: BlockType) -> usize {
        info.blocks
            .iter()
            .filter(|b| b.block_type == block_type)
            .count()
    }

    #[test]
    fn test_straight_line_function() {
        let info = cfg(
            "function add(a: number, b: number): number { return a + b; }",
            "add",
        );
        assert_eq!(info.cyclomatic_complexity, 1);
        assert_eq!(count_type(&info, BlockType::Entry), 1);
        assert_eq!(count_type(&info, BlockType::Return), 1);
        assert_eq!(count_type(&info, BlockType::Exit), 1);
        assert!(info.verify().is_ok());
    }

    #[test]
    fn test_if_else_chain_complexity() {
        let info = cfg(
            r#"
function check(x: number) {
    if (x > 0) return 'p';
    else if (x < 0) return 'n';
    else return 'z';
}
"#,
            "check",
        );
        assert_eq!(info.decision_points, 2);
        assert!(info.cyclomatic_complexity >= 3);
        assert_eq!(count_type(&info, BlockType::Branch), 2);
        assert!(info.verify().is_ok());
    }

    #[test]
    fn test_if_without_else_branch_is_successor() {
        let info = cfg(
            r#"
function clamp(x: number) {
    if (x < 0) {
        x = 0;
    }
    return x;
}
"#,
            "clamp",
        );
        let branch = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::Branch)
            .unwrap();
        let false_edge = info
            .successors(branch.id)
            .into_iter()
            .find(|e| e.edge_type == EdgeType::False)
            .expect("no false edge");
        let target = info.block(false_edge.to).unwrap();
        assert_eq!(target.block_type, BlockType::Return);
    }

    #[test]
    fn test_for_of_loop_back_edge() {
        let info = cfg(
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
        assert!(info.edges.iter().any(|e| e.is_back_edge));
        assert_eq!(count_type(&info, BlockType::LoopHeader), 1);
        assert_eq!(count_type(&info, BlockType::LoopBody), 1);
        assert_eq!(info.cyclomatic_complexity, 2);
        assert!(info.verify().is_ok());
    }

    #[test]
    fn test_while_loop() {
        let info = cfg(
            r#"
function countdown(n: number) {
    while (n > 0) {
        n--;
    }
    return n;
}
"#,
            "countdown",
        );
        let header = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::LoopHeader)
            .unwrap();
        assert_eq!(header.statements, vec!["n > 0"]);
        assert!(info.edges.iter().any(|e| e.is_back_edge));
    }

    #[test]
    fn test_do_while_body_precedes_header() {
        let info = cfg(
            r#"
function run(n: number) {
    do {
        n--;
    } while (n > 0);
    return n;
}
"#,
            "run",
        );
        let header = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::LoopHeader)
            .unwrap();
        let body = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::LoopBody)
            .unwrap();
        assert!(body.id < header.id);
        assert!(info
            .edges
            .iter()
            .any(|e| e.from == header.id && e.to == body.id && e.is_back_edge));
    }

    #[test]
    fn test_switch_cases_and_fallthrough() {
        let info = cfg(
            r#"
function kind(x: number) {
    let label = '';
    switch (x) {
        case 0:
            label = 'zero';
        case 1:
            label = 'small';
            break;
        default:
            label = 'big';
    }
    return label;
}
"#,
            "kind",
        );
        assert!(info
            .edges
            .iter()
            .any(|e| e.edge_type == EdgeType::Fallthrough));
        assert_eq!(
            info.edges
                .iter()
                .filter(|e| e.edge_type == EdgeType::Case)
                .count(),
            2
        );
        assert!(info.edges.iter().any(|e| e.edge_type == EdgeType::Default));
        // case 0, case 1, default
        assert_eq!(info.decision_points, 3);
    }

    #[test]
    fn test_try_catch_finally_shape() {
        let info = cfg(
            r#"
function load(path: string) {
    try {
        read(path);
    } catch (err) {
        log(err);
    } finally {
        cleanup();
    }
    return true;
}
"#,
            "load",
        );
        assert_eq!(count_type(&info, BlockType::Try), 1);
        assert_eq!(count_type(&info, BlockType::Catch), 1);
        assert_eq!(count_type(&info, BlockType::Finally), 1);
        let catch = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::Catch)
            .unwrap();
        assert!(info
            .predecessors(catch.id)
            .iter()
            .any(|e| e.edge_type == EdgeType::Throw));
        // Finally is reached from both the try and catch exits.
        let finally = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::Finally)
            .unwrap();
        assert_eq!(info.predecessors(finally.id).len(), 2);
    }

    #[test]
    fn test_throw_block_terminates() {
        let info = cfg(
            r#"
function must(x: number) {
    if (x < 0) {
        throw new Error('negative');
    }
    return x;
}
"#,
            "must",
        );
        let throw_block = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::Throw)
            .unwrap();
        for edge in info.successors(throw_block.id) {
            assert_eq!(info.block(edge.to).unwrap().block_type, BlockType::Exit);
        }
        assert!(info.exit_blocks.contains(&throw_block.id));
    }

    #[test]
    fn test_block_defines_uses_calls() {
        let info = cfg(
            r#"
function process(data: number[]) {
    const total = combine(data, offset);
    return total;
}
"#,
            "process",
        );
        let body = info
            .blocks
            .iter()
            .find(|b| b.block_type == BlockType::Body)
            .unwrap();
        assert_eq!(body.defines, vec!["total"]);
        assert!(body.uses.contains(&"data".to_string()));
        assert!(body.uses.contains(&"offset".to_string()));
        assert_eq!(body.calls, vec!["combine"]);
    }

    #[test]
    fn test_nesting_depth() {
        let info = cfg(
            r#"
function deep(xs: number[][]) {
    for (const row of xs) {
        for (const x of row) {
            if (x > 0) {
                count++;
            }
        }
    }
    return count;
}
"#,
            "deep",
        );
        assert_eq!(info.max_nesting_depth, 3);
        assert_eq!(info.decision_points, 3);
    }

    #[test]
    fn test_nested_function_gets_own_cfg() {
        let info = cfg(
            r#"
function outer(xs: number[]) {
    const square = (x: number) => x * x;
    function helper(y: number) {
        return y + 1;
    }
    return helper(xs.length);
}
"#,
            "outer",
        );
        assert!(info.nested_functions.contains_key("square"));
        assert!(info.nested_functions.contains_key("helper"));
        let helper = &info.nested_functions["helper"];
        assert_eq!(helper.cyclomatic_complexity, 1);
    }

    #[test]
    fn test_arrow_expression_body() {
        let info = cfg("const double = (x: number) => x * 2;", "double");
        assert_eq!(count_type(&info, BlockType::Return), 1);
        assert_eq!(info.cyclomatic_complexity, 1);
    }

    #[test]
    fn test_missing_function_is_none() {
        let parsed = parse_source(
            "function a() {}",
            Path::new("test.ts"),
            Language::TypeScript,
        )
        .unwrap();
        assert!(build_cfg(&parsed, "missing").unwrap().is_none());
    }
}
