//! Run-level error types.
//!
//! Returned by `Engine::run` when a run is refused, and by `RunReport::into_result` as
//! the single aggregate notice for failed nodes.

use serde::Serialize;
use thiserror::Error;

use crate::graph::{GraphError, NodeId};
use crate::llm::RemoteCallError;

/// Failure of one ai node within a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeFailure {
    pub node: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl NodeFailure {
    pub fn new(node: NodeId, error: &RemoteCallError) -> Self {
        Self {
            node,
            status: error.status,
            message: error.message.clone(),
        }
    }
}

fn describe(failures: &[NodeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.node, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An edge references a missing node, or a readyCount disagrees with the edge list.
    #[error("structural inconsistency: {0}")]
    StructuralInconsistency(String),

    /// The graph has ai units but no api key was supplied; nothing was executed.
    #[error("missing credential: graph contains ai units but no api key is set")]
    MissingCredential,

    /// One or more nodes failed; per-node text is in each failure and in the node's output.
    #[error("{} node(s) failed: {}", .failures.len(), describe(.failures))]
    BranchFailed { failures: Vec<NodeFailure> },

    /// The run was cancelled before every node executed.
    #[error("run cancelled")]
    Cancelled,
}

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Inconsistent(msg) => EngineError::StructuralInconsistency(msg),
            other => EngineError::StructuralInconsistency(other.to_string()),
        }
    }
}
