//! Bounded transitive impact queries over the call graph.

use crate::callgraph::graph::ProjectCallGraph;
use im::{HashSet, Vector};
use serde::Serialize;
use std::path::PathBuf;

/// One caller discovered by the impact query, with the call site to jump to
/// and the depth at which it was found (1 = direct caller).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImpactSite {
    pub caller: String,
    pub callee: String,
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub depth: usize,
}

/// Breadth-first walk over the backward index: everything that transitively
/// calls `qualified_name`, bounded by `max_depth`. Cycles terminate via the
/// visited set; each qualified name is reported at its shallowest depth.
pub fn callers_of(
    graph: &ProjectCallGraph,
    qualified_name: &str,
    max_depth: usize,
) -> Vec<ImpactSite> {
    let mut sites = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: Vector<(String, usize)> = Vector::new();

    visited.insert(qualified_name.to_string());
    queue.push_back((qualified_name.to_string(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for edge in graph.callers_of(&current) {
            let caller = edge.caller.qualified_name.clone();
            sites.push(ImpactSite {
                caller: caller.clone(),
                callee: current.clone(),
                file: edge.call_site.file.clone(),
                line: edge.call_site.line,
                column: edge.call_site.column,
                depth: depth + 1,
            });
            if !visited.contains(&caller) {
                visited.insert(caller.clone());
                queue.push_back((caller, depth + 1));
            }
        }
    }

    sites
}
