//! Events emitted while a graph runs.
//!
//! Produced by `Engine::stream`; the server forwards them as SSE and the CLI prints
//! them in verbose mode.

use serde::Serialize;

use crate::graph::{NodeId, UnitKind};

use super::{RunMode, RunReport};

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Preflight passed and the cycle check chose a scheduler.
    RunStarted {
        nodes: usize,
        cyclic: bool,
        mode: RunMode,
    },
    /// A wave of the cyclic scheduler is about to run.
    Wave { level: usize, nodes: Vec<NodeId> },
    /// A node was dispatched.
    NodeStarted { node: NodeId, kind: UnitKind },
    /// A node produced its output (which is about to be propagated).
    NodeFinished { node: NodeId, output: String },
    /// An ai node's remote call failed.
    NodeFailed { node: NodeId, error: String },
    /// The run ended; carries the full report.
    RunFinished { report: Box<RunReport> },
    /// The run was refused before any node executed.
    RunFailed { error: String },
}

impl RunEvent {
    /// Node this event is about, when it concerns a single node.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            RunEvent::NodeStarted { node, .. }
            | RunEvent::NodeFinished { node, .. }
            | RunEvent::NodeFailed { node, .. } => Some(node),
            _ => None,
        }
    }

    /// True for the last event of a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::RunFinished { .. } | RunEvent::RunFailed { .. })
    }
}
