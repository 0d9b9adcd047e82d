//! Per-function flow analyses: CFG (L3), DFG (L4), and PDG with slicing
//! (L5). Entry points locate the function through a per-file index built in
//! one pass, then run over its body node.

pub mod cfg;
pub mod dfg;
pub mod index;
pub mod pdg;

pub use cfg::build_cfg;
pub use dfg::build_dfg;
pub use index::FunctionIndex;
pub use pdg::{backward_slice, build_pdg, forward_slice};
