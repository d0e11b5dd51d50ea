//! Graph store error.
//!
//! Returned by structural mutations (`add_node`, `add_edge`, ...) and by
//! [`Graph::verify`](super::Graph::verify) when the readyCount invariant is broken.

use thiserror::Error;

use super::NodeId;

/// Error from a structural graph operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint or a mutated node id is not in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// `add_node` with an id that is already registered.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Two nodes would be addressed by the same substitution token.
    #[error("token {token} of node {node} is already used by node {existing}")]
    TokenCollision {
        token: String,
        node: NodeId,
        existing: NodeId,
    },

    /// An internal invariant does not hold (dangling edge, readyCount != in-degree).
    #[error("structural inconsistency: {0}")]
    Inconsistent(String),
}
