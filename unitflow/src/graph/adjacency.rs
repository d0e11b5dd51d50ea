//! Index-based out-neighbor lists, built once per traversal.

use std::collections::HashMap;

use super::{Graph, NodeId};

/// Dense view of the graph: node `i` is `ids[i]`, its successors are `out[i]`
/// in edge insertion order (duplicates kept).
pub(crate) struct Adjacency<'g> {
    pub ids: Vec<&'g NodeId>,
    pub out: Vec<Vec<usize>>,
}

impl<'g> Adjacency<'g> {
    pub fn build(graph: &'g Graph) -> Self {
        let ids: Vec<&NodeId> = graph.node_ids().iter().collect();
        let index: HashMap<&NodeId, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut out = vec![Vec::new(); ids.len()];
        for edge in graph.edges() {
            if let (Some(&f), Some(&t)) = (index.get(&edge.from), index.get(&edge.to)) {
                out[f].push(t);
            }
        }
        Self { ids, out }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
