//! One node's execution: process, record, emit, propagate.

use crate::graph::{Graph, NodeId};

use super::logging::{log_node_complete, log_node_failed, log_node_start};
use super::processor::{process, NodeOutcome};
use super::propagate::transmit;
use super::run_context::{RunContext, RunState};
use super::{RunEvent, RunMode};

/// Runs a claimed node. Returns the successors that became ready, or `None` when the
/// node failed and its branch stops here.
///
/// A failed remote call is recorded in both modes and its error marker becomes the
/// node's output. Sequential runs forward the marker downstream; parallel runs do not
/// transmit.
pub(crate) async fn step(
    graph: &Graph,
    id: &NodeId,
    state: &RunState,
    ctx: &RunContext,
    mode: RunMode,
) -> Option<Vec<NodeId>> {
    let node = graph.node(id)?;
    log_node_start(id, node.kind());
    ctx.emit(RunEvent::NodeStarted {
        node: id.clone(),
        kind: node.kind(),
    })
    .await;

    let value = match process(graph, node, state, ctx).await {
        NodeOutcome::Value(value) => value,
        NodeOutcome::Failed { marker, error } => {
            log_node_failed(id, &error);
            ctx.emit(RunEvent::NodeFailed {
                node: id.clone(),
                error: error.to_string(),
            })
            .await;
            state.record_failure(id, error);
            finish(id, &marker, state, ctx).await;
            return match mode {
                RunMode::Sequential => Some(transmit(graph, state, id, &marker)),
                RunMode::Parallel => None,
            };
        }
    };

    log_node_complete(id, value.len());
    finish(id, &value, state, ctx).await;
    Some(transmit(graph, state, id, &value))
}

async fn finish(id: &NodeId, value: &str, state: &RunState, ctx: &RunContext) {
    state.record_output(id, value);
    ctx.emit(RunEvent::NodeFinished {
        node: id.clone(),
        output: value.to_string(),
    })
    .await;
}
