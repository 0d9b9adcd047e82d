//! Program-dependence graph construction: CFG blocks become nodes, control
//! dependence fans out from predicates, data dependence comes from the DFG
//! def–use edges matched to nodes by line and variable.

use crate::core::errors::Result;
use crate::flow::cfg::builder::build_for_indexed as build_cfg_for;
use crate::flow::cfg::types::{BlockType, CfgInfo};
use crate::flow::dfg::builder::build_for_indexed as build_dfg_for;
use crate::flow::dfg::types::DfgInfo;
use crate::flow::index::FunctionIndex;
use crate::flow::pdg::types::{PdgEdge, PdgEdgeType, PdgInfo, PdgNode, PdgNodeType};
use crate::parsers::ParsedFile;

/// Build the PDG for the named function. Returns `Ok(None)` when the
/// function cannot be located.
pub fn build_pdg(parsed: &ParsedFile, function_name: &str) -> Result<Option<PdgInfo>> {
    let index = FunctionIndex::build(parsed);
    let Some(function) = index.get(function_name) else {
        return Ok(None);
    };
    let cfg = build_cfg_for(parsed, function);
    let dfg = build_dfg_for(parsed, function);
    Ok(Some(combine(cfg, dfg)))
}

/// Combine a CFG and DFG over the same function body into a PDG.
pub fn combine(cfg: CfgInfo, dfg: DfgInfo) -> PdgInfo {
    let mut nodes = Vec::with_capacity(cfg.blocks.len());
    for block in &cfg.blocks {
        let node_type = if block.id == cfg.entry_block {
            PdgNodeType::Entry
        } else if matches!(block.block_type, BlockType::Branch | BlockType::LoopHeader) {
            PdgNodeType::Predicate
        } else if cfg.exit_blocks.contains(&block.id) {
            PdgNodeType::Exit
        } else {
            PdgNodeType::Statement
        };
        nodes.push(PdgNode {
            id: block.id,
            line: block.start_line,
            statement: block.statements.join("; "),
            node_type,
            defines: block.defines.clone(),
            uses: block.uses.clone(),
            cfg_block_id: Some(block.id),
        });
    }

    let mut edges = Vec::new();

    // Control dependence: each predicate governs its distinct CFG successors.
    for node in &nodes {
        if node.node_type != PdgNodeType::Predicate {
            continue;
        }
        let mut targets: Vec<(usize, String)> = Vec::new();
        for cfg_edge in cfg.successors(node.id) {
            let label = cfg_edge
                .condition
                .clone()
                .unwrap_or_else(|| format!("{:?}", cfg_edge.edge_type).to_lowercase());
            if !targets.iter().any(|(to, _)| *to == cfg_edge.to) {
                targets.push((cfg_edge.to, label));
            }
        }
        for (to, label) in targets {
            if to == node.id {
                continue;
            }
            edges.push(PdgEdge {
                from: node.id,
                to,
                edge_type: PdgEdgeType::Control,
                variable: None,
                label,
            });
        }
    }
    let control_edge_count = edges.len();

    // Data dependence: match each def-use edge to the defining and using
    // nodes by line and variable.
    for dfg_edge in &dfg.edges {
        let variable = &dfg_edge.variable;
        let source = nodes
            .iter()
            .find(|n| n.line == dfg_edge.def.line && n.defines.contains(variable));
        let target = nodes
            .iter()
            .find(|n| n.line == dfg_edge.use_ref.line && n.uses.contains(variable));
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        if source.id == target.id {
            continue;
        }
        let duplicate = edges.iter().any(|e| {
            e.edge_type == PdgEdgeType::Data
                && e.from == source.id
                && e.to == target.id
                && e.variable.as_deref() == Some(variable.as_str())
        });
        if duplicate {
            continue;
        }
        edges.push(PdgEdge {
            from: source.id,
            to: target.id,
            edge_type: PdgEdgeType::Data,
            variable: Some(variable.clone()),
            label: format!(
                "{variable}: {}\u{2192}{}",
                dfg_edge.def.line, dfg_edge.use_ref.line
            ),
        });
    }
    let data_edge_count = edges.len() - control_edge_count;

    let info = PdgInfo {
        function_name: cfg.function_name.clone(),
        file_path: cfg.file_path.clone(),
        entry_node: cfg.entry_block,
        exit_nodes: cfg.exit_blocks.clone(),
        nodes,
        edges,
        cfg,
        dfg,
        control_edge_count,
        data_edge_count,
    };
    debug_assert!(info.verify().is_ok(), "pdg invariant violation");
    info
}
