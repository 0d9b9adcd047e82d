//! L5: program-dependence graphs and slicing.

pub mod builder;
pub mod slice;
pub mod types;

pub use builder::build_pdg;
pub use slice::{backward_slice, forward_slice, SliceResult};
pub use types::{PdgEdge, PdgEdgeType, PdgInfo, PdgNode, PdgNodeType};
