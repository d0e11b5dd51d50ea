//! Shared builders for engine tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use unitflow::{
    CancellationFlag, CodeEvaluator, Credentials, Engine, Graph, MockCompletion, NodeId, RunMode,
    Unit, UserCodeError,
};

pub fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

/// Engine over `mock` with a test api key.
pub fn engine(mock: &Arc<MockCompletion>, mode: RunMode) -> Engine {
    Engine::new(mock.clone())
        .with_credentials(Credentials::new("sk-test"))
        .with_mode(mode)
}

/// Evaluator that sets `flag` and answers "done" for every custom unit.
pub fn cancelling_evaluator(flag: &CancellationFlag) -> Arc<dyn CodeEvaluator> {
    let flag = flag.clone();
    Arc::new(
        move |_: &str, _: &BTreeMap<String, String>| -> Result<String, UserCodeError> {
            flag.cancel();
            Ok("done".to_string())
        },
    )
}

/// Builds a graph from `(id, unit)` pairs and `(from, to)` edges.
pub fn graph(nodes: Vec<(&str, Unit)>, edges: &[(&str, &str)]) -> Graph {
    let mut g = Graph::new();
    for (node, unit) in nodes {
        g.add_node(node, unit).unwrap();
    }
    for (from, to) in edges {
        g.add_edge(*from, *to).unwrap();
    }
    g
}

/// `input-1 ("hello") -> ai-1 ("Say $input_1 loudly") -> output-1`.
pub fn hello_chain() -> Graph {
    graph(
        vec![
            ("input-1", Unit::input("hello")),
            ("ai-1", Unit::ai("Say $input_1 loudly")),
            ("output-1", Unit::output()),
        ],
        &[("input-1", "ai-1"), ("ai-1", "output-1")],
    )
}

/// `input-1 -> {ai-1, ai-2} -> output-1`, with `ai-1`'s edge to the output added first.
pub fn diamond() -> Graph {
    graph(
        vec![
            ("input-1", Unit::input("x")),
            ("ai-1", Unit::ai("left $input_1")),
            ("ai-2", Unit::ai("right $input_1")),
            ("output-1", Unit::output()),
        ],
        &[
            ("input-1", "ai-1"),
            ("input-1", "ai-2"),
            ("ai-1", "output-1"),
            ("ai-2", "output-1"),
        ],
    )
}
