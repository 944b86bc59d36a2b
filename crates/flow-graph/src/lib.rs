//! State-graph orchestration for research-flow
//!
//! A workflow is described as named nodes connected by fixed edges and by
//! conditional edges whose target is picked by a router function. The graph is
//! validated once by [`StateGraph::compile`] and then driven step by step by
//! [`CompiledGraph::invoke`], which owns the state for the whole run and hands
//! it to exactly one node at a time.

pub mod compiled;
pub mod conditional;
pub mod error;
pub mod graph;
pub mod node;
pub mod observer;
pub mod visualization;

// Re-export for convenience
pub use compiled::{CompiledGraph, DEFAULT_STEP_LIMIT};
pub use conditional::ConditionalEdges;
pub use error::CompilationError;
pub use graph::{END, START, StateGraph};
pub use node::{FnNode, Node};
pub use observer::StepObserver;
pub use visualization::{Edge, Topology};
