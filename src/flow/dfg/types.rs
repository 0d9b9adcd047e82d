//! Data-flow graph records (L4).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    Def,
    Use,
    /// Read-modify-write: `x += 1`, `x++`.
    Update,
    Param,
    /// Free variable read by a nested function.
    Capture,
}

impl RefType {
    pub fn is_definition(&self) -> bool {
        matches!(self, RefType::Def | RefType::Param | RefType::Update)
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, RefType::Use | RefType::Update | RefType::Capture)
    }
}

/// One occurrence of a variable.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub ref_type: RefType,
    pub line: usize,
    pub column: usize,
    /// Enclosing function name.
    pub scope: String,
    pub is_in_closure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// A def–use pair. `is_may_reach` means "there exists a definition that may
/// reach this use along some path"; with the line-order heuristic it is set
/// exactly when another definition sits between the two lines, the same
/// signal `has_intervening_def` carries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DefUseEdge {
    pub variable: String,
    pub def: VarRef,
    #[serde(rename = "use")]
    pub use_ref: VarRef,
    pub is_may_reach: bool,
    pub has_intervening_def: bool,
}

/// The data-flow graph of one function body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DfgInfo {
    pub function_name: String,
    pub file_path: PathBuf,
    pub refs: Vec<VarRef>,
    pub edges: Vec<DefUseEdge>,
    /// Distinct names that are defined in this function (params included).
    pub variables: Vec<String>,
    pub parameters: Vec<String>,
    /// Identifiers returned directly.
    pub returns: Vec<String>,
    /// Reserved for a dominance-based reaching-definitions pass.
    #[serde(default)]
    pub reaching_defs: BTreeMap<String, Vec<usize>>,
    /// Reserved for a liveness pass.
    #[serde(default)]
    pub live_vars: BTreeMap<String, Vec<usize>>,
}

impl DfgInfo {
    pub fn refs_of(&self, name: &str) -> Vec<&VarRef> {
        self.refs.iter().filter(|r| r.name == name).collect()
    }

    pub fn edges_of(&self, name: &str) -> Vec<&DefUseEdge> {
        self.edges.iter().filter(|e| e.variable == name).collect()
    }

    /// Edge-side invariants: every def side is a definition, every use side
    /// a usage, and definitions never follow their uses.
    pub fn verify(&self) -> Result<(), String> {
        for (i, edge) in self.edges.iter().enumerate() {
            if !edge.def.ref_type.is_definition() {
                return Err(format!("edge {i}: def side has type {:?}", edge.def.ref_type));
            }
            if !edge.use_ref.ref_type.is_usage() {
                return Err(format!(
                    "edge {i}: use side has type {:?}",
                    edge.use_ref.ref_type
                ));
            }
            if edge.def.line > edge.use_ref.line {
                return Err(format!(
                    "edge {i}: def at line {} follows use at line {}",
                    edge.def.line, edge.use_ref.line
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_type_classification() {
        assert!(RefType::Def.is_definition());
        assert!(RefType::Param.is_definition());
        assert!(RefType::Update.is_definition());
        assert!(!RefType::Use.is_definition());

        assert!(RefType::Use.is_usage());
        assert!(RefType::Update.is_usage());
        assert!(RefType::Capture.is_usage());
        assert!(!RefType::Param.is_usage());
    }
}
