//! Branch-parallel runs of acyclic graphs.

use std::sync::Arc;

use unitflow::{CancellationFlag, EngineError, MockCompletion, RunMode, Unit};

use crate::common::{cancelling_evaluator, diamond, engine, graph, hello_chain, id};

/// **Scenario**: Diamond fan-out/fan-in; the join is in edge order whatever finishes first.
#[tokio::test]
async fn diamond_joins_in_edge_order() {
    let mock = Arc::new(MockCompletion::uppercase());
    let report = engine(&mock, RunMode::Parallel)
        .run(&diamond())
        .await
        .unwrap();
    assert_eq!(report.value("output-1"), Some("LEFT X\nRIGHT X"));
    assert_eq!(mock.calls(), 2);
    assert_eq!(report.order.first(), Some(&id("input-1")));
    assert_eq!(report.order.last(), Some(&id("output-1")));
}

/// **Scenario**: Twenty branches converge on one output; it is dispatched exactly once
/// and receives every value.
#[tokio::test]
async fn wide_fan_in_dispatches_join_once() {
    let mut nodes = vec![("input-1", Unit::input("v")), ("output-1", Unit::output())];
    let names: Vec<String> = (1..=20).map(|i| format!("ai-{}", i)).collect();
    for name in &names {
        nodes.push((name.as_str(), Unit::ai("$input_1")));
    }
    let mut edges = Vec::new();
    for name in &names {
        edges.push(("input-1", name.as_str()));
        edges.push((name.as_str(), "output-1"));
    }
    let g = graph(nodes, &edges);

    let mock = Arc::new(MockCompletion::uppercase());
    let report = engine(&mock, RunMode::Parallel).run(&g).await.unwrap();
    assert_eq!(mock.calls(), 20);
    let output_runs = report.order.iter().filter(|n| **n == id("output-1")).count();
    assert_eq!(output_runs, 1);
    assert_eq!(report.value("output-1").unwrap().lines().count(), 20);
}

/// **Scenario**: A failed branch stops at the failing node, which keeps its error marker
/// as output; the sibling branch completes and the run surfaces one aggregate failure.
#[tokio::test]
async fn failure_aborts_only_its_branch() {
    let g = graph(
        vec![
            ("input-1", Unit::input("x")),
            ("ai-1", Unit::ai("boom $input_1")),
            ("ai-2", Unit::ai("fine $input_1")),
            ("output-1", Unit::output()),
            ("output-2", Unit::output()),
        ],
        &[
            ("input-1", "ai-1"),
            ("input-1", "ai-2"),
            ("ai-1", "output-1"),
            ("ai-2", "output-2"),
        ],
    );
    let mock = Arc::new(MockCompletion::uppercase().with_fail_on("boom"));
    let report = engine(&mock, RunMode::Parallel).run(&g).await.unwrap();

    assert_eq!(report.value("output-2"), Some("FINE X"));
    assert_eq!(
        report.value("ai-1"),
        Some("Error: remote call failed (500): mock failure on boom")
    );
    assert_eq!(report.skipped, vec![id("output-1")]);
    match report.into_result() {
        Err(EngineError::BranchFailed { failures }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].node, id("ai-1"));
        }
        other => panic!("expected BranchFailed, got {:?}", other),
    }
}

/// **Scenario**: Without failures, parallel and sequential runs agree on every value.
#[tokio::test]
async fn parallel_matches_sequential() {
    for g in [hello_chain(), diamond()] {
        let mock = Arc::new(MockCompletion::uppercase());
        let seq = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
        let par = engine(&mock, RunMode::Parallel).run(&g).await.unwrap();
        assert_eq!(seq.values, par.values);
        assert_eq!(seq.outputs(), par.outputs());
    }
}

/// **Scenario**: Cancelling inside one branch of a fan-out lets the sibling that was
/// already dispatched finish, but neither branch dispatches its successor.
#[tokio::test]
async fn cancellation_during_fan_out_keeps_in_flight_outputs() {
    let g = graph(
        vec![
            ("input-1", Unit::input("x")),
            ("custom-1", Unit::custom("'done'")),
            ("ai-1", Unit::ai("$input_1")),
            ("output-1", Unit::output()),
            ("output-2", Unit::output()),
        ],
        &[
            ("input-1", "custom-1"),
            ("input-1", "ai-1"),
            ("custom-1", "output-1"),
            ("ai-1", "output-2"),
        ],
    );
    let cancel = CancellationFlag::new();
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Parallel)
        .with_evaluator(cancelling_evaluator(&cancel))
        .run_with_cancel(&g, &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.value("custom-1"), Some("done"));
    assert_eq!(report.value("ai-1"), Some("x"));
    assert_eq!(report.skipped, vec![id("output-1"), id("output-2")]);
    assert_eq!(report.order.len(), 3);
    assert!(matches!(report.into_result(), Err(EngineError::Cancelled)));
}
