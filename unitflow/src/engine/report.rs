//! Result of one graph run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EngineError, NodeFailure};
use crate::graph::{Graph, NodeId, UnitKind};

use super::run_context::{Arrival, RunState};
use super::RunMode;

/// Per-node outputs and bookkeeping of a finished (or cancelled) run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub cyclic: bool,
    pub mode: RunMode,
    /// Nodes that produced an output, in completion order.
    pub order: Vec<NodeId>,
    /// Output of every node that produced one, including error markers.
    pub values: BTreeMap<NodeId, String>,
    /// Received buffers, ordered by edge position.
    pub received: BTreeMap<NodeId, Vec<Arrival>>,
    /// Wave index of each node; empty for acyclic runs.
    pub levels: BTreeMap<NodeId, usize>,
    pub failures: Vec<NodeFailure>,
    /// Nodes never dispatched (downstream of a failure, or after cancellation).
    pub skipped: Vec<NodeId>,
    pub cancelled: bool,
    #[serde(skip)]
    output_units: Vec<NodeId>,
}

impl RunReport {
    pub(crate) fn collect(
        graph: &Graph,
        state: &RunState,
        cyclic: bool,
        mode: RunMode,
        levels: BTreeMap<NodeId, usize>,
        cancelled: bool,
    ) -> Self {
        let values = graph
            .node_ids()
            .iter()
            .filter_map(|id| state.output(id).map(|v| (id.clone(), v)))
            .collect();
        let skipped = graph
            .node_ids()
            .iter()
            .filter(|id| !state.is_claimed(id))
            .cloned()
            .collect();
        let failures = state
            .failures()
            .into_iter()
            .map(|(id, e)| NodeFailure::new(id, &e))
            .collect();
        let output_units = graph
            .nodes()
            .filter(|n| n.kind() == UnitKind::Output)
            .map(|n| n.id.clone())
            .collect();
        Self {
            cyclic,
            mode,
            order: state.completed(),
            values,
            received: state.all_arrivals(),
            levels,
            failures,
            skipped,
            cancelled,
            output_units,
        }
    }

    /// Values of the output units that produced one.
    pub fn outputs(&self) -> BTreeMap<NodeId, String> {
        self.output_units
            .iter()
            .filter_map(|id| self.values.get(id).map(|v| (id.clone(), v.clone())))
            .collect()
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// Turns failed nodes into one `BranchFailed` error, and cancellation into `Cancelled`.
    pub fn into_result(self) -> Result<Self, EngineError> {
        if !self.failures.is_empty() {
            return Err(EngineError::BranchFailed {
                failures: self.failures,
            });
        }
        if self.cancelled {
            return Err(EngineError::Cancelled);
        }
        Ok(self)
    }
}
