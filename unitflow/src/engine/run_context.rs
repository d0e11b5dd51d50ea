//! Per-run context and mutable run state.
//!
//! [`RunContext`] carries what nodes need from outside the graph: the collaborators,
//! credentials, model selection, the cancellation flag and an optional event sender.
//! [`RunState`] holds the per-node counters and buffers for one run. The graph itself
//! is only read, so the same graph can be run again or concurrently.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::evaluator::CodeEvaluator;
use crate::graph::{Graph, NodeId};
use crate::llm::{CompletionClient, Credentials, ModelSelector};

use super::{RunEvent, SymbolTable};

/// Shared flag observed between node completions; once set, no further node starts.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a node processor needs besides the graph.
#[derive(Clone)]
pub struct RunContext {
    pub completion: Arc<dyn CompletionClient>,
    pub evaluator: Arc<dyn CodeEvaluator>,
    pub credentials: Option<Credentials>,
    pub model: ModelSelector,
    pub cancel: CancellationFlag,
    pub events: Option<mpsc::Sender<RunEvent>>,
}

impl RunContext {
    /// Sends an event when streaming; a dropped receiver is ignored.
    pub(crate) async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}

/// One value delivered along an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    /// Position of the carrying edge in the graph's edge list.
    pub edge: usize,
    pub source: NodeId,
    pub value: String,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Slot {
    ready: AtomicUsize,
    claimed: AtomicBool,
    arrivals: Mutex<Vec<Arrival>>,
    output: Mutex<Option<String>>,
}

/// Mutable state of one run, shared by reference between concurrent branches.
pub struct RunState {
    slots: HashMap<NodeId, Slot>,
    symbols: SymbolTable,
    completed: Mutex<Vec<NodeId>>,
    failures: Mutex<Vec<(NodeId, crate::llm::RemoteCallError)>>,
}

impl RunState {
    /// Initializes counters from the graph's readyCounts; buffers start empty.
    pub fn new(graph: &Graph) -> Self {
        let slots = graph
            .nodes()
            .map(|n| {
                let slot = Slot {
                    ready: AtomicUsize::new(n.ready_count()),
                    claimed: AtomicBool::new(false),
                    arrivals: Mutex::new(Vec::new()),
                    output: Mutex::new(None),
                };
                (n.id.clone(), slot)
            })
            .collect();
        Self {
            slots,
            symbols: SymbolTable::build(graph),
            completed: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Inputs still outstanding for `id`.
    pub fn remaining(&self, id: &NodeId) -> usize {
        self.slots
            .get(id)
            .map(|s| s.ready.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Records an arrival, then decrements the counter without going below zero.
    ///
    /// Returns the count after the decrement and whether this call performed the
    /// one-to-zero transition.
    pub fn deliver(&self, to: &NodeId, arrival: Arrival) -> Option<(usize, bool)> {
        let slot = self.slots.get(to)?;
        lock(&slot.arrivals).push(arrival);
        let previous = slot
            .ready
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        Some(match previous {
            Ok(n) => (n - 1, n == 1),
            Err(_) => (0, false),
        })
    }

    /// Marks `id` as dispatched. True only for the first caller.
    pub fn claim(&self, id: &NodeId) -> bool {
        self.slots
            .get(id)
            .map(|s| {
                s.claimed
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub fn is_claimed(&self, id: &NodeId) -> bool {
        self.slots
            .get(id)
            .map(|s| s.claimed.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Values received so far by `id`, ordered by edge position.
    pub fn arrivals(&self, id: &NodeId) -> Vec<Arrival> {
        let mut out = self
            .slots
            .get(id)
            .map(|s| lock(&s.arrivals).clone())
            .unwrap_or_default();
        out.sort_by_key(|a| a.edge);
        out
    }

    pub fn record_output(&self, id: &NodeId, value: &str) {
        if let Some(slot) = self.slots.get(id) {
            *lock(&slot.output) = Some(value.to_string());
        }
        lock(&self.completed).push(id.clone());
    }

    pub fn record_failure(&self, id: &NodeId, error: crate::llm::RemoteCallError) {
        lock(&self.failures).push((id.clone(), error));
    }

    pub fn output(&self, id: &NodeId) -> Option<String> {
        self.slots.get(id).and_then(|s| lock(&s.output).clone())
    }

    /// Nodes that produced an output, in completion order.
    pub fn completed(&self) -> Vec<NodeId> {
        lock(&self.completed).clone()
    }

    /// Number of nodes dispatched so far.
    pub fn executed(&self) -> usize {
        self.slots
            .values()
            .filter(|s| s.claimed.load(Ordering::Acquire))
            .count()
    }

    pub fn failures(&self) -> Vec<(NodeId, crate::llm::RemoteCallError)> {
        lock(&self.failures).clone()
    }

    /// Arrivals of every node that received at least one value.
    pub fn all_arrivals(&self) -> BTreeMap<NodeId, Vec<Arrival>> {
        self.slots
            .keys()
            .map(|id| (id.clone(), self.arrivals(id)))
            .filter(|(_, a)| !a.is_empty())
            .collect()
    }
}
