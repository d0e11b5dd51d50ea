//! Dry run of the wave schedule.
//!
//! Replays the cyclic scheduler's bookkeeping without processing any node, assuming
//! every node delivers. The result matches the levels of a sequential run that is not
//! cancelled.

use crate::graph::{Graph, NodeId};

use super::propagate::transmit;
use super::run_context::RunState;
use super::waves::WaveSchedule;

/// Nodes grouped by the wave they would run in; `waves[k]` is wave `k`, in dispatch order.
pub fn wave_plan(graph: &Graph) -> Vec<Vec<NodeId>> {
    let state = RunState::new(graph);
    let mut schedule = WaveSchedule::new(graph);
    let mut waves = Vec::new();

    while let Some(wave) = schedule.next_wave(graph, &state) {
        let mut ran = Vec::with_capacity(wave.nodes.len());
        let mut ready = Vec::new();
        for id in wave.nodes {
            if state.claim(&id) {
                ready.extend(transmit(graph, &state, &id, ""));
                ran.push(id);
            }
        }
        schedule.advance(&state, ready);
        waves.push(ran);
    }
    waves
}
