//! DFS postorder linearization.
//!
//! Each node is pushed after all of its descendants; reading the stack from the top
//! gives an order where every node precedes its successors. Roots are taken in node
//! insertion order and successors in edge order, so the result is deterministic.
//! On a cyclic graph back edges are ignored and the order is only a best effort.

use super::adjacency::Adjacency;
use super::{Graph, NodeId};

/// Topological order of all nodes (first element runs first).
pub fn topological_order(graph: &Graph) -> Vec<NodeId> {
    let adj = Adjacency::build(graph);
    let mut visited = vec![false; adj.len()];
    let mut postorder: Vec<usize> = Vec::with_capacity(adj.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..adj.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            if let Some(&succ) = adj.out[node].get(*next) {
                *next += 1;
                if !visited[succ] {
                    visited[succ] = true;
                    stack.push((succ, 0));
                }
            } else {
                postorder.push(node);
                stack.pop();
            }
        }
    }

    postorder
        .into_iter()
        .rev()
        .map(|i| adj.ids[i].clone())
        .collect()
}
