//! depthmap: layered static analysis for TypeScript/JavaScript.
//!
//! Five representations, each built on the ones below it:
//!
//! - **L1** module structure ([`structure`]): declarations, signatures,
//!   imports/exports.
//! - **L2** call graph ([`callgraph`]): cross-file call edges with
//!   forward/backward indices and impact queries.
//! - **L3** control-flow graphs ([`flow::cfg`]): typed basic blocks and
//!   edges, cyclomatic complexity.
//! - **L4** data-flow graphs ([`flow::dfg`]): variable references and
//!   def–use edges.
//! - **L5** program-dependence graphs ([`flow::pdg`]): control plus data
//!   dependence, with backward and forward slicing.
//!
//! All results are immutable value records with stable serialisation.

pub mod callgraph;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod flow;
pub mod io;
pub mod observability;
pub mod output;
pub mod parsers;
pub mod structure;

pub use crate::callgraph::{build_call_graph, ProjectCallGraph};
pub use crate::core::errors::{AnalysisError, Result};
pub use crate::core::{Language, Span};
pub use crate::flow::{backward_slice, build_cfg, build_dfg, build_pdg, forward_slice};
pub use crate::structure::{extract_module, ModuleInfo};
