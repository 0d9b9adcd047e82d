//! L4: data-flow graphs.

pub mod builder;
pub mod builtins;
pub mod types;

pub use builder::build_dfg;
pub use types::{DefUseEdge, DfgInfo, RefType, VarRef};
