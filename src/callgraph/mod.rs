//! L2: project call graph.
//!
//! Per-file call scanning, cross-file name resolution, forward/backward
//! indices, and bounded transitive impact queries.

pub mod builder;
pub mod graph;
pub mod impact;
pub mod scan;

pub use builder::{build_call_graph, build_call_graph_cancellable, CallGraphBuild};
pub use graph::{CallEdge, CallSite, CallType, FunctionLocation, ProjectCallGraph};
pub use impact::{callers_of, ImpactSite};
pub use scan::{scan_calls, FileCallScan, ScannedCall};
