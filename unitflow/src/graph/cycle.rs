//! Cycle detection by three-color DFS.
//!
//! White = unvisited, gray = on the current DFS path, black = finished. Reaching a gray
//! node again is a back edge, i.e. a directed cycle. Every node is used as a root so
//! disconnected components are covered. Iterative, so deep chains do not overflow.

use super::adjacency::Adjacency;
use super::Graph;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Returns true if the edge set contains a directed cycle (self-loops included).
pub fn has_cycle(graph: &Graph) -> bool {
    let adj = Adjacency::build(graph);
    let mut color = vec![Color::White; adj.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..adj.len() {
        if color[root] != Color::White {
            continue;
        }
        color[root] = Color::Gray;
        stack.push((root, 0));

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            if let Some(&succ) = adj.out[node].get(*next) {
                *next += 1;
                match color[succ] {
                    Color::Gray => return true,
                    Color::White => {
                        color[succ] = Color::Gray;
                        stack.push((succ, 0));
                    }
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                stack.pop();
            }
        }
    }
    false
}
