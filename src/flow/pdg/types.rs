//! Program-dependence graph records (L5).

use crate::flow::cfg::types::CfgInfo;
use crate::flow::dfg::types::DfgInfo;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PdgNodeType {
    Entry,
    Statement,
    Predicate,
    Exit,
}

/// One PDG node, mirroring a CFG block.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PdgNode {
    pub id: usize,
    pub line: usize,
    pub statement: String,
    pub node_type: PdgNodeType,
    pub defines: Vec<String>,
    pub uses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_block_id: Option<usize>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PdgEdgeType {
    Control,
    Data,
    /// Reserved; never produced today.
    Anti,
    /// Reserved; never produced today.
    Output,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PdgEdge {
    pub from: usize,
    pub to: usize,
    pub edge_type: PdgEdgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    pub label: String,
}

/// The program-dependence graph of one function: control plus data
/// dependence, carrying the CFG and DFG it was built from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PdgInfo {
    pub function_name: String,
    pub file_path: PathBuf,
    pub nodes: Vec<PdgNode>,
    pub edges: Vec<PdgEdge>,
    pub entry_node: usize,
    pub exit_nodes: Vec<usize>,
    pub cfg: CfgInfo,
    pub dfg: DfgInfo,
    pub control_edge_count: usize,
    pub data_edge_count: usize,
}

impl PdgInfo {
    pub fn node(&self, id: usize) -> Option<&PdgNode> {
        self.nodes.get(id)
    }

    /// Incoming edges sorted by source id, so traversal is deterministic.
    pub fn incoming(&self, id: usize) -> Vec<&PdgEdge> {
        let mut edges: Vec<&PdgEdge> = self.edges.iter().filter(|e| e.to == id).collect();
        edges.sort_by_key(|e| e.from);
        edges
    }

    /// Outgoing edges sorted by target id.
    pub fn outgoing(&self, id: usize) -> Vec<&PdgEdge> {
        let mut edges: Vec<&PdgEdge> = self.edges.iter().filter(|e| e.from == id).collect();
        edges.sort_by_key(|e| e.to);
        edges
    }

    /// Control edges originate only at predicates; data edges carry a
    /// variable the source defines and the target uses.
    pub fn verify(&self) -> Result<(), String> {
        for (i, edge) in self.edges.iter().enumerate() {
            let from = self
                .node(edge.from)
                .ok_or_else(|| format!("edge {i}: missing source node"))?;
            let to = self
                .node(edge.to)
                .ok_or_else(|| format!("edge {i}: missing target node"))?;
            match edge.edge_type {
                PdgEdgeType::Control => {
                    if from.node_type != PdgNodeType::Predicate {
                        return Err(format!(
                            "edge {i}: control edge from non-predicate node {}",
                            from.id
                        ));
                    }
                }
                PdgEdgeType::Data => {
                    let variable = edge
                        .variable
                        .as_ref()
                        .ok_or_else(|| format!("edge {i}: data edge without variable"))?;
                    if !from.defines.contains(variable) {
                        return Err(format!(
                            "edge {i}: source does not define {variable}"
                        ));
                    }
                    if !to.uses.contains(variable) {
                        return Err(format!("edge {i}: target does not use {variable}"));
                    }
                }
                PdgEdgeType::Anti | PdgEdgeType::Output => {}
            }
        }
        Ok(())
    }
}
