//! Branch-parallel scheduler for acyclic graphs.
//!
//! Every node with no inputs starts at once. When a node completes, all successors it
//! made ready start concurrently and the branch waits for all of them. A failed node
//! stops its own branch; sibling branches run to completion.

use futures::future::{join_all, BoxFuture};

use crate::graph::{Graph, NodeId};

use super::run_context::{RunContext, RunState};
use super::step::step;
use super::RunMode;

/// Runs an acyclic graph with branch fan-out.
pub(crate) async fn run_branches(graph: &Graph, state: &RunState, ctx: &RunContext) {
    let roots: Vec<NodeId> = graph
        .nodes()
        .filter(|n| n.ready_count() == 0)
        .map(|n| n.id.clone())
        .collect();
    dispatch(graph, state, ctx, roots).await;
}

/// Starts every node in `ids` that this caller wins the claim for.
async fn dispatch(graph: &Graph, state: &RunState, ctx: &RunContext, ids: Vec<NodeId>) {
    if ctx.cancel.is_cancelled() {
        return;
    }
    let branches: Vec<_> = ids
        .into_iter()
        .filter(|id| state.claim(id))
        .map(|id| branch(graph, state, ctx, id))
        .collect();
    join_all(branches).await;
}

fn branch<'a>(
    graph: &'a Graph,
    state: &'a RunState,
    ctx: &'a RunContext,
    id: NodeId,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        if let Some(ready) = step(graph, &id, state, ctx, RunMode::Parallel).await {
            dispatch(graph, state, ctx, ready).await;
        }
    })
}
