//! Control-flow graph records (L3).

use crate::core::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Entry,
    Exit,
    Body,
    Branch,
    LoopHeader,
    LoopBody,
    Try,
    Catch,
    Finally,
    Return,
    Throw,
}

/// One basic block: statement texts plus the identifiers written, read, and
/// called while executing it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CfgBlock {
    pub id: usize,
    pub block_type: BlockType,
    pub start_line: usize,
    pub end_line: usize,
    pub span: Span,
    pub statements: Vec<String>,
    pub calls: Vec<String>,
    pub defines: Vec<String>,
    pub uses: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Unconditional,
    True,
    False,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Throw,
    BackEdge,
    Fallthrough,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CfgEdge {
    pub from: usize,
    pub to: usize,
    pub edge_type: EdgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub is_back_edge: bool,
}

/// The control-flow graph of one function body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CfgInfo {
    pub function_name: String,
    pub file_path: PathBuf,
    pub blocks: Vec<CfgBlock>,
    pub edges: Vec<CfgEdge>,
    pub entry_block: usize,
    pub exit_blocks: Vec<usize>,
    pub cyclomatic_complexity: usize,
    pub max_nesting_depth: usize,
    pub decision_points: usize,
    pub nested_functions: BTreeMap<String, CfgInfo>,
}

impl CfgInfo {
    pub fn block(&self, id: usize) -> Option<&CfgBlock> {
        self.blocks.get(id)
    }

    pub fn successors(&self, id: usize) -> Vec<&CfgEdge> {
        self.edges.iter().filter(|e| e.from == id).collect()
    }

    pub fn predecessors(&self, id: usize) -> Vec<&CfgEdge> {
        self.edges.iter().filter(|e| e.to == id).collect()
    }

    /// Structural invariants: entry is an entry block with no incoming
    /// edges; exit blocks have an exit-like type; return/throw blocks only
    /// flow to the function exit; complexity matches `max(1, E - N + 2)`.
    pub fn verify(&self) -> Result<(), String> {
        let entry = self
            .block(self.entry_block)
            .ok_or_else(|| "entry block missing".to_string())?;
        if entry.block_type != BlockType::Entry {
            return Err(format!("entry block has type {:?}", entry.block_type));
        }
        if !self.predecessors(self.entry_block).is_empty() {
            return Err("entry block has incoming edges".to_string());
        }

        for &exit in &self.exit_blocks {
            let block = self
                .block(exit)
                .ok_or_else(|| format!("exit block {exit} missing"))?;
            let exit_like = matches!(
                block.block_type,
                BlockType::Exit | BlockType::Return | BlockType::Throw
            );
            if !exit_like && !self.successors(exit).is_empty() {
                return Err(format!("exit block {exit} has outgoing edges"));
            }
        }

        for block in &self.blocks {
            if matches!(block.block_type, BlockType::Return | BlockType::Throw) {
                for edge in self.successors(block.id) {
                    let target = self
                        .block(edge.to)
                        .ok_or_else(|| format!("edge to missing block {}", edge.to))?;
                    if target.block_type != BlockType::Exit {
                        return Err(format!(
                            "block {} of type {:?} flows past the function exit",
                            block.id, block.block_type
                        ));
                    }
                }
            }
        }

        let expected = cyclomatic(self.edges.len(), self.blocks.len());
        if self.cyclomatic_complexity != expected {
            return Err(format!(
                "cyclomatic complexity {} != max(1, {} - {} + 2)",
                self.cyclomatic_complexity,
                self.edges.len(),
                self.blocks.len()
            ));
        }
        Ok(())
    }
}

/// `max(1, E - N + 2)`.
pub fn cyclomatic(edges: usize, blocks: usize) -> usize {
    (edges + 2).saturating_sub(blocks).max(1)
}
