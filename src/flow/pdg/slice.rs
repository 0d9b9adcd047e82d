//! Backward and forward program slicing over the PDG.

use crate::flow::pdg::types::{PdgEdgeType, PdgInfo, PdgNode};
use serde::Serialize;
use std::collections::BTreeSet;

/// A slice: the lines (and nodes) that may influence, or be influenced by,
/// the criterion. An out-of-range criterion yields an empty slice with the
/// flag set; that is a warning, not an error.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SliceResult {
    pub criterion_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    pub lines: BTreeSet<usize>,
    pub node_ids: Vec<usize>,
    pub out_of_range: bool,
}

impl SliceResult {
    fn empty(line: usize, variable: Option<&str>, out_of_range: bool) -> Self {
        Self {
            criterion_line: line,
            variable: variable.map(String::from),
            lines: BTreeSet::new(),
            node_ids: Vec::new(),
            out_of_range,
        }
    }
}

/// Statements that may influence the criterion `(line, variable?)`.
pub fn backward_slice(pdg: &PdgInfo, line: usize, variable: Option<&str>) -> SliceResult {
    slice(pdg, line, variable, Direction::Backward)
}

/// Statements that may be influenced by the criterion. With a variable the
/// walk follows only data edges carrying it.
pub fn forward_slice(pdg: &PdgInfo, line: usize, variable: Option<&str>) -> SliceResult {
    slice(pdg, line, variable, Direction::Forward)
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Backward,
    Forward,
}

fn slice(pdg: &PdgInfo, line: usize, variable: Option<&str>, direction: Direction) -> SliceResult {
    if !within_extent(pdg, line) {
        return SliceResult::empty(line, variable, true);
    }

    let seeds = seed_nodes(pdg, line, variable);
    if seeds.is_empty() {
        return SliceResult::empty(line, variable, false);
    }

    let mut visited: BTreeSet<usize> = BTreeSet::new();
    let mut stack: Vec<usize> = seeds;
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        let Some(node) = pdg.node(current) else {
            continue;
        };

        let neighbours: Vec<(usize, &_)> = match direction {
            Direction::Backward => pdg
                .incoming(current)
                .into_iter()
                .map(|e| (e.from, e))
                .collect(),
            Direction::Forward => pdg
                .outgoing(current)
                .into_iter()
                .map(|e| (e.to, e))
                .collect(),
        };

        for (next, edge) in neighbours {
            let follow = match (edge.edge_type, variable) {
                (PdgEdgeType::Control, None) => true,
                // Control dependence always matters for backward slices;
                // variable-filtered forward slices follow data only.
                (PdgEdgeType::Control, Some(_)) => direction == Direction::Backward,
                (PdgEdgeType::Data, None) => true,
                (PdgEdgeType::Data, Some(var)) => {
                    // The filter binds once the walk reaches nodes that
                    // carry the variable; elsewhere the chain of defs
                    // feeding this node is followed as-is.
                    edge.variable.as_deref() == Some(var) || !involves(node, var)
                }
                (PdgEdgeType::Anti | PdgEdgeType::Output, _) => false,
            };
            if follow && !visited.contains(&next) {
                stack.push(next);
            }
        }
    }

    let mut lines = BTreeSet::new();
    let mut node_ids: Vec<usize> = visited.iter().copied().collect();
    node_ids.sort_unstable();
    for &id in &node_ids {
        if let Some(node) = pdg.node(id) {
            lines.insert(node.line);
        }
    }

    SliceResult {
        criterion_line: line,
        variable: variable.map(String::from),
        lines,
        node_ids,
        out_of_range: false,
    }
}

fn within_extent(pdg: &PdgInfo, line: usize) -> bool {
    let start = pdg.cfg.blocks.iter().map(|b| b.start_line).min();
    let end = pdg.cfg.blocks.iter().map(|b| b.end_line).max();
    match (start, end) {
        (Some(start), Some(end)) => line >= start && line <= end,
        _ => false,
    }
}

/// Nodes on the criterion line. When a variable is given, nodes touching it
/// are preferred; the line alone still seeds when none do, since the
/// variable narrows traversal rather than the entry point. When no node
/// starts on the exact line, blocks spanning it are accepted.
fn seed_nodes(pdg: &PdgInfo, line: usize, variable: Option<&str>) -> Vec<usize> {
    let on_line: Vec<&PdgNode> = pdg.nodes.iter().filter(|n| n.line == line).collect();

    let candidates: Vec<&PdgNode> = if on_line.is_empty() {
        pdg.cfg
            .blocks
            .iter()
            .filter(|b| b.start_line <= line && line <= b.end_line)
            .filter_map(|b| pdg.node(b.id))
            .collect()
    } else {
        on_line
    };

    if let Some(var) = variable {
        let touching: Vec<usize> = candidates
            .iter()
            .filter(|n| involves(n, var))
            .map(|n| n.id)
            .collect();
        if !touching.is_empty() {
            return touching;
        }
    }
    candidates.into_iter().map(|n| n.id).collect()
}

fn involves(node: &PdgNode, variable: &str) -> bool {
    node.defines.iter().any(|v| v == variable) || node.uses.iter().any(|v| v == variable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use crate::flow::pdg::builder::build_pdg;
    use crate::parsers::parse_source;
    use std::path::Path;

    fn pdg(source: &str, name: &str) -> PdgInfo {
        let parsed =
            parse_source(source, Path::new("test.ts"), Language::TypeScript).unwrap();
        build_pdg(&parsed, name).unwrap().expect("function not found")
    }

    const CHAIN: &str = r#"
function f(a: number, b: number) {
    let x = a + 1;
    let y = b + 2;
    let z = x + y;
    return z;
}
"#;

    #[test]
    fn test_backward_slice_unfiltered() {
        let info = pdg(CHAIN, "f");
        let slice = backward_slice(&info, 6, None);
        assert!(!slice.out_of_range);
        for line in [3, 4, 5, 6] {
            assert!(slice.lines.contains(&line), "line {line} missing: {slice:?}");
        }
    }

    #[test]
    fn test_backward_slice_variable_filtered() {
        let info = pdg(CHAIN, "f");
        let slice = backward_slice(&info, 6, Some("x"));
        assert!(slice.lines.contains(&3), "def of x missing: {slice:?}");
        assert!(slice.lines.contains(&5));
        assert!(slice.lines.contains(&6));
        assert!(
            !slice.lines.contains(&4),
            "y's def should be filtered out: {slice:?}"
        );
    }

    #[test]
    fn test_forward_slice_follows_variable() {
        let info = pdg(CHAIN, "f");
        let slice = forward_slice(&info, 3, Some("x"));
        assert!(slice.lines.contains(&3));
        assert!(slice.lines.contains(&5), "use of x missing: {slice:?}");
    }

    #[test]
    fn test_forward_slice_unfiltered_reaches_return() {
        let info = pdg(CHAIN, "f");
        let slice = forward_slice(&info, 3, None);
        assert!(slice.lines.contains(&5));
        assert!(slice.lines.contains(&6));
    }

    #[test]
    fn test_slice_through_branch_keeps_predicate() {
        let info = pdg(
            r#"
function g(flag: boolean, n: number) {
    let result = 0;
    if (flag) {
        result = n + 1;
    }
    return result;
}
"#,
            "g",
        );
        let slice = backward_slice(&info, 7, None);
        // The branch predicate controls the assignment feeding the return.
        assert!(slice.lines.contains(&4), "predicate missing: {slice:?}");
        assert!(slice.lines.contains(&5));
    }

    #[test]
    fn test_out_of_range_criterion() {
        let info = pdg(CHAIN, "f");
        let slice = backward_slice(&info, 400, None);
        assert!(slice.out_of_range);
        assert!(slice.lines.is_empty());
    }

    #[test]
    fn test_slice_idempotence() {
        let info = pdg(CHAIN, "f");
        let first = backward_slice(&info, 6, None);
        for &line in &first.lines {
            let again = backward_slice(&info, line, None);
            assert!(
                again.lines.is_subset(&first.lines),
                "slice from line {line} escaped the original slice"
            );
        }
    }

    #[test]
    fn test_determinism() {
        let info = pdg(CHAIN, "f");
        let a = backward_slice(&info, 6, Some("x"));
        let b = backward_slice(&info, 6, Some("x"));
        assert_eq!(a, b);
    }
}
