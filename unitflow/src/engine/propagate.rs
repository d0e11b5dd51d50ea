//! Propagator: delivers a node's output along its outgoing edges.

use crate::graph::{Graph, NodeId};

use super::logging::log_propagate;
use super::run_context::{Arrival, RunState};

/// Appends `value` to the buffer of every direct successor of `from` and decrements its
/// counter. Returns the successors whose counter reached zero on this call, in edge order.
///
/// Parallel edges deliver once per edge; a self-loop delivers to `from` itself.
pub fn transmit(graph: &Graph, state: &RunState, from: &NodeId, value: &str) -> Vec<NodeId> {
    let mut ready = Vec::new();
    for (index, edge) in graph.edges().iter().enumerate() {
        if &edge.from != from {
            continue;
        }
        let arrival = Arrival {
            edge: index,
            source: from.clone(),
            value: value.to_string(),
        };
        if let Some((remaining, reached_zero)) = state.deliver(&edge.to, arrival) {
            log_propagate(from, &edge.to, remaining);
            if reached_zero {
                ready.push(edge.to.clone());
            }
        }
    }
    ready
}
