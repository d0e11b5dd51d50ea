//! Topological and wavefront schedulers.
//!
//! Acyclic graphs run in topological order, one node at a time. Cyclic graphs run in
//! waves: wave 0 is every node with no inputs; a node joins wave `k + 1` when its last
//! outstanding input arrives during wave `k`. When a wave comes up empty while nodes are
//! still unrun (a cycle nothing feeds), the unrun node with the fewest outstanding inputs
//! is released into it. Every node runs at most once.

use std::collections::BTreeMap;

use futures::future::join_all;

use crate::graph::{topological_order, Graph, NodeId};

use super::logging::{log_wave, log_wave_seed};
use super::run_context::{RunContext, RunState};
use super::step::step;
use super::waves::WaveSchedule;
use super::{RunEvent, RunMode};

/// Runs an acyclic graph one node at a time in topological order.
pub(crate) async fn run_topological(graph: &Graph, state: &RunState, ctx: &RunContext) {
    for id in topological_order(graph) {
        if ctx.cancel.is_cancelled() {
            return;
        }
        if state.claim(&id) {
            step(graph, &id, state, ctx, RunMode::Sequential).await;
        }
    }
}

/// Runs a cyclic graph in waves. Returns the wave index of every dispatched node.
///
/// In parallel mode the nodes of a wave run concurrently, and nodes downstream of a
/// failed node are never seeded.
pub(crate) async fn run_waves(
    graph: &Graph,
    state: &RunState,
    ctx: &RunContext,
    mode: RunMode,
) -> BTreeMap<NodeId, usize> {
    let mut schedule = WaveSchedule::new(graph);

    while !ctx.cancel.is_cancelled() {
        let Some(wave) = schedule.next_wave(graph, state) else { break };
        if let (true, Some(seed)) = (wave.seeded, wave.nodes.first()) {
            log_wave_seed(wave.level, seed, state.remaining(seed));
        }
        log_wave(wave.level, wave.nodes.len());
        ctx.emit(RunEvent::Wave {
            level: wave.level,
            nodes: wave.nodes.clone(),
        })
        .await;

        let mut ready = Vec::new();
        match mode {
            RunMode::Sequential => {
                for id in &wave.nodes {
                    if ctx.cancel.is_cancelled() {
                        break;
                    }
                    if !state.claim(id) {
                        continue;
                    }
                    if let Some(next) = step(graph, id, state, ctx, mode).await {
                        ready.extend(next);
                    }
                }
            }
            RunMode::Parallel => {
                let claimed: Vec<&NodeId> =
                    wave.nodes.iter().filter(|id| state.claim(id)).collect();
                let results =
                    join_all(claimed.iter().map(|id| step(graph, id, state, ctx, mode))).await;
                for (id, result) in claimed.into_iter().zip(results) {
                    match result {
                        Some(next) => ready.extend(next),
                        None => schedule.block_downstream(graph, state, id),
                    }
                }
            }
        }
        schedule.advance(state, ready);
    }

    schedule.into_levels(state)
}
