//! Project call-graph records (L2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Lightweight identity of a callable inside the project.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FunctionLocation {
    pub file: PathBuf,
    /// Short name: `name` or `Class.method`.
    pub name: String,
    /// `<moduleName>.<Class.method | name>`.
    pub qualified_name: String,
    pub line: usize,
    pub is_exported: bool,
}

/// Where a call happens in source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallSite {
    pub file: PathBuf,
    /// Qualified name of the enclosing function.
    pub caller: String,
    pub line: usize,
    pub column: usize,
    pub is_method_call: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub argument_count: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Direct,
    Method,
    /// Reserved; never produced today.
    Constructor,
    /// Reserved; never produced today.
    Callback,
    Dynamic,
}

/// One call site, resolved or dynamic.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CallEdge {
    pub caller: FunctionLocation,
    /// Callee text as written (unresolved).
    pub callee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_location: Option<FunctionLocation>,
    pub call_site: CallSite,
    pub is_dynamic: bool,
    pub call_type: CallType,
}

/// The project-wide call graph: owned locations and edges plus positional
/// forward/backward indices (indices reference `edges` by position, so the
/// edge list stays the single owner).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectCallGraph {
    pub project_root: PathBuf,
    pub files: Vec<PathBuf>,
    pub functions: BTreeMap<String, FunctionLocation>,
    pub edges: Vec<CallEdge>,
    forward_index: BTreeMap<String, Vec<usize>>,
    backward_index: BTreeMap<String, Vec<usize>>,
    pub built_at: DateTime<Utc>,
}

impl ProjectCallGraph {
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            files: Vec::new(),
            functions: BTreeMap::new(),
            edges: Vec::new(),
            forward_index: BTreeMap::new(),
            backward_index: BTreeMap::new(),
            built_at: Utc::now(),
        }
    }

    /// Register a function location. First registration of a qualified name
    /// wins; duplicates are reported to the caller.
    pub fn add_function(&mut self, location: FunctionLocation) -> bool {
        use std::collections::btree_map::Entry;
        match self.functions.entry(location.qualified_name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(location);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Append an edge and keep both indices in sync. Edges stay in source
    /// order per caller because the builder feeds them in source order.
    pub fn add_edge(&mut self, edge: CallEdge) {
        let position = self.edges.len();
        self.forward_index
            .entry(edge.caller.qualified_name.clone())
            .or_default()
            .push(position);
        if let Some(callee) = &edge.callee_location {
            self.backward_index
                .entry(callee.qualified_name.clone())
                .or_default()
                .push(position);
        }
        self.edges.push(edge);
    }

    pub fn function(&self, qualified_name: &str) -> Option<&FunctionLocation> {
        self.functions.get(qualified_name)
    }

    /// Outgoing edges of a caller, insertion order.
    pub fn callees_of(&self, qualified_name: &str) -> Vec<&CallEdge> {
        self.forward_index
            .get(qualified_name)
            .map(|positions| positions.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Incoming edges of a callee, insertion order.
    pub fn callers_of(&self, qualified_name: &str) -> Vec<&CallEdge> {
        self.backward_index
            .get(qualified_name)
            .map(|positions| positions.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check the structural invariants: every edge is indexed under its
    /// caller; resolved edges are indexed under their callee; every
    /// qualified name referenced by an edge is registered.
    pub fn verify(&self) -> Result<(), String> {
        for (position, edge) in self.edges.iter().enumerate() {
            let caller = &edge.caller.qualified_name;
            if !self.functions.contains_key(caller) {
                return Err(format!("edge {position}: unknown caller {caller}"));
            }
            let forward_ok = self
                .forward_index
                .get(caller)
                .is_some_and(|v| v.contains(&position));
            if !forward_ok {
                return Err(format!("edge {position}: missing from forward index"));
            }
            if let Some(callee) = &edge.callee_location {
                let name = &callee.qualified_name;
                if !self.functions.contains_key(name) {
                    return Err(format!("edge {position}: unknown callee {name}"));
                }
                let backward_ok = self
                    .backward_index
                    .get(name)
                    .is_some_and(|v| v.contains(&position));
                if !backward_ok {
                    return Err(format!("edge {position}: missing from backward index"));
                }
            }
        }
        Ok(())
    }

    /// Serialisation with the build timestamp removed, so identical inputs
    /// produce byte-identical output.
    pub fn to_stable_json(&self) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("built_at");
        }
        serde_json::to_string_pretty(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(file: &str, name: &str, qualified: &str) -> FunctionLocation {
        FunctionLocation {
            file: PathBuf::from(file),
            name: name.to_string(),
            qualified_name: qualified.to_string(),
            line: 1,
            is_exported: false,
        }
    }

    fn edge(caller: FunctionLocation, callee: Option<FunctionLocation>) -> CallEdge {
        let callee_name = callee
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        CallEdge {
            call_site: CallSite {
                file: caller.file.clone(),
                caller: caller.qualified_name.clone(),
                line: 2,
                column: 4,
                is_method_call: false,
                receiver: None,
                argument_count: 0,
            },
            is_dynamic: callee.is_none(),
            call_type: if callee.is_some() {
                CallType::Direct
            } else {
                CallType::Dynamic
            },
            caller,
            callee: callee_name,
            callee_location: callee,
        }
    }

    #[test]
    fn test_indices_stay_in_sync() {
        let mut graph = ProjectCallGraph::new(PathBuf::from("/p"));
        let main = location("b.ts", "main", "b.main");
        let helper = location("a.ts", "helper", "a.helper");
        graph.add_function(main.clone());
        graph.add_function(helper.clone());
        graph.add_edge(edge(main.clone(), Some(helper.clone())));

        assert_eq!(graph.callees_of("b.main").len(), 1);
        assert_eq!(graph.callers_of("a.helper").len(), 1);
        assert!(graph.verify().is_ok());
    }

    #[test]
    fn test_duplicate_qualified_name_rejected() {
        let mut graph = ProjectCallGraph::new(PathBuf::from("/p"));
        assert!(graph.add_function(location("a.ts", "f", "a.f")));
        assert!(!graph.add_function(location("a.ts", "f", "a.f")));
        assert_eq!(graph.function_count(), 1);
    }

    #[test]
    fn test_dynamic_edge_not_in_backward_index() {
        let mut graph = ProjectCallGraph::new(PathBuf::from("/p"));
        let main = location("b.ts", "main", "b.main");
        graph.add_function(main.clone());
        graph.add_edge(edge(main, None));

        assert_eq!(graph.callees_of("b.main").len(), 1);
        assert!(graph.callers_of("unknown").is_empty());
        assert!(graph.verify().is_ok());
    }

    #[test]
    fn test_stable_json_omits_timestamp() {
        let graph = ProjectCallGraph::new(PathBuf::from("/p"));
        let json = graph.to_stable_json().unwrap();
        assert!(!json.contains("built_at"));

        let again = ProjectCallGraph::new(PathBuf::from("/p"));
        assert_eq!(json, again.to_stable_json().unwrap());
    }
}
