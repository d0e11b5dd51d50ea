//! Logging utilities for graph runs.
//!
//! Structured events for run start/finish, node execution, propagation and wave
//! scheduling. With the `tracing` feature they go through `tracing`; without it they
//! are printed to stderr.

use crate::graph::{NodeId, UnitKind};

use super::RunMode;

/// Log run start, after the cycle check.
pub fn log_run_start(nodes: usize, cyclic: bool, mode: RunMode) {
    #[cfg(feature = "tracing")]
    tracing::info!(nodes, cyclic, ?mode, "Starting graph run");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[INFO] Starting graph run: nodes={} cyclic={} mode={:?}",
        nodes, cyclic, mode
    );
}

/// Log node execution start.
pub fn log_node_start(node: &NodeId, kind: UnitKind) {
    #[cfg(feature = "tracing")]
    tracing::debug!(node = %node, %kind, "Starting node");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Starting node: {} ({})", node, kind);
}

/// Log node completion with the size of its output.
pub fn log_node_complete(node: &NodeId, output_len: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(node = %node, output_len, "Node complete");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Node complete: {} ({} bytes)", node, output_len);
}

/// Log a remote call failure of an ai unit.
pub fn log_node_failed(node: &NodeId, error: &crate::llm::RemoteCallError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(node = %node, %error, "Node failed");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[WARN] Node failed: {}: {}", node, error);
}

/// Log a custom unit whose code failed; the run continues with the sentinel output.
pub fn log_user_code_error(node: &NodeId, error: &crate::evaluator::UserCodeError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(node = %node, %error, "Custom code failed");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[WARN] Custom code failed: {}: {}", node, error);
}

/// Log one value crossing an edge.
pub fn log_propagate(from: &NodeId, to: &NodeId, remaining: usize) {
    #[cfg(feature = "tracing")]
    tracing::trace!(from = %from, to = %to, remaining, "Value delivered");

    #[cfg(not(feature = "tracing"))]
    let _ = (from, to, remaining);
}

/// Log a wave about to run.
pub fn log_wave(level: usize, size: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(level, size, "Running wave");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Running wave {} ({} nodes)", level, size);
}

/// Log a node released into an otherwise empty wave to break a cycle.
pub fn log_wave_seed(level: usize, node: &NodeId, outstanding: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(level, node = %node, outstanding, "Seeding blocked cycle");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[DEBUG] Seeding blocked cycle at wave {}: {} ({} inputs outstanding)",
        level, node, outstanding
    );
}

/// Log that cancellation was observed; no further nodes are dispatched.
pub fn log_cancelled(executed: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(executed, "Run cancelled");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] Run cancelled after {} nodes", executed);
}

/// Log run completion.
pub fn log_run_complete(executed: usize, failed: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(executed, failed, "Graph run complete");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[INFO] Graph run complete: executed={} failed={}",
        executed, failed
    );
}

/// Log a run refused before any node executed.
pub fn log_run_error(error: &super::EngineError) {
    #[cfg(feature = "tracing")]
    tracing::error!(%error, "Graph run refused");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] Graph run refused: {}", error);
}
