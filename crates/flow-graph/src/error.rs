//! Graph compilation errors

use thiserror::Error;

/// Error returned by [`crate::StateGraph::compile`] when the topology is invalid
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge or route references a node that was never added
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No entry point, or more than one
    #[error("graph must have exactly one edge from START")]
    MissingEntry,

    /// No edge or route ever reaches END
    #[error("no path reaches END")]
    MissingEnd,

    /// A node has two fixed outgoing edges
    #[error("node has more than one outgoing edge: {0}")]
    DuplicateEdge(String),

    /// A node has both a fixed edge and conditional edges
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A node has no outgoing transition at all
    #[error("node has no outgoing edge: {0}")]
    DeadEnd(String),

    /// Conditional edges declared with an empty route table
    #[error("conditional edges from '{0}' declare no routes")]
    EmptyRouteTable(String),
}
