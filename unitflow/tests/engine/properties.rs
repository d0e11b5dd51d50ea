//! Randomized properties of the graph store, cycle detector and schedulers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use unitflow::{
    has_cycle, topological_order, wave_plan, Graph, MockCompletion, NodeId, RunMode, Unit,
};

use crate::common::engine;

fn node_id(i: usize) -> NodeId {
    NodeId::new(format!("custom-{}", i))
}

fn nodes(n: usize) -> Graph {
    let mut g = Graph::new();
    for i in 0..n {
        g.add_node(node_id(i), Unit::custom(format!("'n{}'", i)))
            .unwrap();
    }
    g
}

/// Node count and forward edges `(from < to)`.
fn forward_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 1..n * 3)
            .prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.min(b), a.max(b)))
                    .collect::<Vec<_>>()
            })
            .prop_filter("needs an edge", |e| !e.is_empty());
        (Just(n), edges)
    })
}

#[derive(Clone, Debug)]
enum Op {
    AddEdge(usize, usize),
    DeleteEdge(usize, usize),
    DeleteNode(usize),
}

fn op(n: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..n, 0..n).prop_map(|(a, b)| Op::AddEdge(a, b)),
        2 => (0..n, 0..n).prop_map(|(a, b)| Op::DeleteEdge(a, b)),
        1 => (0..n).prop_map(Op::DeleteNode),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// A DAG has no cycle and every edge goes forward in the topological order; reversing
    /// any one of its edges as an extra back edge creates a cycle.
    #[test]
    fn dag_plus_back_edge((n, edges) in forward_edges(), pick in any::<prop::sample::Index>()) {
        let mut g = nodes(n);
        for &(a, b) in &edges {
            g.add_edge(node_id(a), node_id(b)).unwrap();
        }
        prop_assert!(!has_cycle(&g));

        let order = topological_order(&g);
        prop_assert_eq!(order.len(), n);
        let pos: HashMap<&NodeId, usize> = order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        for e in g.edges() {
            prop_assert!(pos[&e.from] < pos[&e.to]);
        }

        let (a, b) = edges[pick.index(edges.len())];
        g.add_edge(node_id(b), node_id(a)).unwrap();
        prop_assert!(has_cycle(&g));
    }

    /// After any sequence of edits every readyCount equals the in-degree recounted from
    /// the edge list.
    #[test]
    fn ready_count_tracks_in_degree(ops in prop::collection::vec(op(8), 0..60)) {
        let mut g = nodes(8);
        for op in ops {
            match op {
                Op::AddEdge(a, b) => {
                    let live = g.contains(&node_id(a)) && g.contains(&node_id(b));
                    prop_assert_eq!(g.add_edge(node_id(a), node_id(b)).is_ok(), live);
                }
                Op::DeleteEdge(a, b) => {
                    g.delete_edge(&node_id(a), &node_id(b));
                }
                Op::DeleteNode(a) => {
                    g.delete_node(&node_id(a));
                }
            }
            prop_assert!(g.verify().is_ok());
            for node in g.nodes() {
                let recount = g.edges().iter().filter(|e| e.to == node.id).count();
                prop_assert_eq!(node.ready_count(), recount);
            }
        }
    }

    /// On arbitrary graphs (cycles, self-loops, duplicates) both modes run every node
    /// exactly once, and sequential waves land where the dry-run plan puts them.
    #[test]
    fn every_node_runs_once(
        n in 1usize..10,
        pairs in prop::collection::vec((0usize..10, 0usize..10), 0..30),
        parallel in any::<bool>(),
    ) {
        let mut g = nodes(n);
        for (a, b) in pairs {
            if a < n && b < n {
                g.add_edge(node_id(a), node_id(b)).unwrap();
            }
        }
        let mode = if parallel { RunMode::Parallel } else { RunMode::Sequential };
        let mock = Arc::new(MockCompletion::echo());
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let report = rt.block_on(engine(&mock, mode).run(&g)).unwrap();

        prop_assert_eq!(report.order.len(), n);
        let distinct: HashSet<&NodeId> = report.order.iter().collect();
        prop_assert_eq!(distinct.len(), n);
        prop_assert!(report.skipped.is_empty());
        prop_assert_eq!(report.cyclic, has_cycle(&g));
        if report.cyclic && mode == RunMode::Sequential {
            let planned: HashMap<NodeId, usize> = wave_plan(&g)
                .into_iter()
                .enumerate()
                .flat_map(|(level, wave)| wave.into_iter().map(move |id| (id, level)))
                .collect();
            for (id, level) in &report.levels {
                prop_assert_eq!(planned[id], *level);
            }
            prop_assert_eq!(planned.len(), report.levels.len());
        }
    }
}
