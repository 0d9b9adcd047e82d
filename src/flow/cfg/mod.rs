//! L3: control-flow graphs.

pub mod builder;
pub mod types;

pub use builder::build_cfg;
pub use types::{BlockType, CfgBlock, CfgEdge, CfgInfo, EdgeType};
