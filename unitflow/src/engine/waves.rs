//! Wave bookkeeping shared by the cyclic scheduler and the dry-run plan.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::graph::{Graph, NodeId};

use super::run_context::RunState;

/// Next wave to dispatch.
pub(crate) struct Wave {
    pub level: usize,
    pub nodes: Vec<NodeId>,
    /// Set when nothing was ready and the first node was released to break a cycle.
    pub seeded: bool,
}

/// Level assignment of a wavefront run.
///
/// Wave 0 is every node with no inputs; a node joins wave `k + 1` when it becomes ready
/// during wave `k`. An empty wave releases the unrun, unblocked node with the fewest
/// outstanding inputs, earliest inserted on ties.
pub(crate) struct WaveSchedule {
    levels: HashMap<NodeId, usize>,
    blocked: HashSet<NodeId>,
    current: usize,
}

impl WaveSchedule {
    pub fn new(graph: &Graph) -> Self {
        let levels = graph
            .nodes()
            .filter(|n| n.ready_count() == 0)
            .map(|n| (n.id.clone(), 0))
            .collect();
        Self {
            levels,
            blocked: HashSet::new(),
            current: 0,
        }
    }

    /// Unclaimed nodes of the current level, or a seed when there are none. `None` once
    /// every node is claimed or blocked.
    pub fn next_wave(&mut self, graph: &Graph, state: &RunState) -> Option<Wave> {
        let current = self.current;
        let nodes: Vec<NodeId> = graph
            .node_ids()
            .iter()
            .filter(|id| self.levels.get(*id) == Some(&current) && !state.is_claimed(id))
            .cloned()
            .collect();
        if !nodes.is_empty() {
            return Some(Wave {
                level: current,
                nodes,
                seeded: false,
            });
        }

        let seed = graph
            .node_ids()
            .iter()
            .filter(|id| !state.is_claimed(id) && !self.blocked.contains(*id))
            .min_by_key(|id| state.remaining(id))?
            .clone();
        self.levels.insert(seed.clone(), current);
        Some(Wave {
            level: current,
            nodes: vec![seed],
            seeded: true,
        })
    }

    /// Places the nodes made ready during the current wave in the next one, then moves on.
    pub fn advance(&mut self, state: &RunState, ready: Vec<NodeId>) {
        for id in ready {
            if !state.is_claimed(&id) {
                self.levels.entry(id).or_insert(self.current + 1);
            }
        }
        self.current += 1;
    }

    /// Keeps every unrun node reachable from `failed` from ever being seeded.
    pub fn block_downstream(&mut self, graph: &Graph, state: &RunState, failed: &NodeId) {
        let mut stack = vec![failed.clone()];
        while let Some(id) = stack.pop() {
            for edge in graph.outgoing(&id) {
                if !state.is_claimed(&edge.to) && self.blocked.insert(edge.to.clone()) {
                    stack.push(edge.to.clone());
                }
            }
        }
    }

    /// Wave index of every node that was dispatched.
    pub fn into_levels(self, state: &RunState) -> BTreeMap<NodeId, usize> {
        self.levels
            .into_iter()
            .filter(|(id, _)| state.is_claimed(id))
            .collect()
    }
}
