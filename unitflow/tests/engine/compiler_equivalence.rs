//! Compiled programs, run later, reproduce the engine's output values.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use unitflow::engine::RunContext;
use unitflow::{
    CancellationFlag, Credentials, ExprEvaluator, Graph, MockCompletion, ModelSelector,
    NodeId, PipelineCompiler, Program, RunMode, Unit, UnitKind,
};

use crate::common::{diamond, engine, graph, hello_chain};

fn context(mock: &Arc<MockCompletion>) -> RunContext {
    RunContext {
        completion: mock.clone(),
        evaluator: Arc::new(ExprEvaluator),
        credentials: Some(Credentials::new("sk-test")),
        model: ModelSelector::Standard,
        cancel: CancellationFlag::new(),
        events: None,
    }
}

/// Runs `g` on the engine and through export -> parse -> run; returns both output maps.
async fn both(
    g: &Graph,
    mock: MockCompletion,
) -> (BTreeMap<NodeId, String>, BTreeMap<NodeId, String>) {
    let mock = Arc::new(mock);
    let report = engine(&mock, RunMode::Sequential).run(g).await.unwrap();
    let text = PipelineCompiler::new().export(g).unwrap();
    let program = Program::parse(&text).unwrap();
    let out = program
        .run(&BTreeMap::new(), &context(&mock))
        .await
        .unwrap();
    (report.outputs(), out.outputs)
}

#[tokio::test]
async fn fixed_graphs_match() {
    let joined = graph(
        vec![
            ("input-1", Unit::input("a")),
            ("custom-1", Unit::custom("upper($input_1) + inputs.input_1")),
            ("output-1", Unit::output()),
        ],
        &[
            ("input-1", "custom-1"),
            ("input-1", "output-1"),
            ("custom-1", "output-1"),
            ("input-1", "output-1"),
        ],
    );
    for g in [hello_chain(), diamond(), joined] {
        let (engine_out, program_out) = both(&g, MockCompletion::uppercase()).await;
        assert!(!engine_out.is_empty());
        assert_eq!(engine_out, program_out);
    }
}

/// **Scenario**: Error markers from failed calls and the user-code sentinel come out the
/// same on both paths.
#[tokio::test]
async fn failures_match() {
    let g = graph(
        vec![
            ("input-1", Unit::input("boom")),
            ("ai-1", Unit::ai("$input_1")),
            ("custom-1", Unit::custom("nope(")),
            ("output-1", Unit::output()),
        ],
        &[
            ("input-1", "ai-1"),
            ("ai-1", "output-1"),
            ("custom-1", "output-1"),
        ],
    );
    let (engine_out, program_out) =
        both(&g, MockCompletion::echo().with_fail_on("boom")).await;
    assert_eq!(engine_out, program_out);
    assert!(engine_out[&NodeId::from("output-1")].starts_with("Error: remote call failed"));
}

fn kind_of(k: u8) -> UnitKind {
    UnitKind::ALL[k as usize % UnitKind::ALL.len()]
}

/// Random DAG: node kinds plus forward edges (`from < to`), duplicates allowed.
fn dag() -> impl Strategy<Value = (Vec<u8>, Vec<(usize, usize)>)> {
    (2usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(0u8..4, n),
            prop::collection::vec((0..n, 0..n), 0..n * 2),
        )
    })
}

fn build(kinds: &[u8], edges: &[(usize, usize)]) -> Graph {
    let mut g = Graph::new();
    let mut tokens: Vec<String> = Vec::new();
    let mut ids: Vec<NodeId> = Vec::new();
    for (i, k) in kinds.iter().enumerate() {
        let kind = kind_of(*k);
        let template = match kind {
            UnitKind::Input => format!("v{}", i),
            UnitKind::Output => String::new(),
            UnitKind::Ai => format!("p{} {}", i, tokens.join(" ")),
            UnitKind::Custom => {
                let mut args = vec![format!("'c{}'", i)];
                args.extend(tokens.iter().cloned());
                format!("concat({})", args.join(", "))
            }
        };
        let id = NodeId::new(format!("{}-{}", kind.as_str(), i));
        g.add_node(id.clone(), Unit::new(kind, template)).unwrap();
        tokens.push(g.token(&id).unwrap().as_str().to_string());
        ids.push(id);
    }
    for &(a, b) in edges {
        if a != b {
            g.add_edge(ids[a.min(b)].clone(), ids[a.max(b)].clone())
                .unwrap();
        }
    }
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For random acyclic graphs the compiled program's outputs equal the engine's.
    #[test]
    fn random_dags_match((kinds, edges) in dag()) {
        let g = build(&kinds, &edges);
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (engine_out, program_out) =
            rt.block_on(both(&g, MockCompletion::uppercase().with_fail_on("P3")));
        prop_assert_eq!(engine_out, program_out);
    }
}
