//! Cyclic graphs: wave scheduling.

use std::sync::Arc;

use unitflow::{CancellationFlag, Graph, MockCompletion, RunMode, Unit};

use crate::common::{cancelling_evaluator, engine, graph, id};

/// **Scenario**: A -> B -> A with no entry point runs each node exactly once.
#[tokio::test]
async fn two_node_cycle_runs_each_node_once() {
    let g = graph(
        vec![
            ("ai-1", Unit::ai("ping $ai_2")),
            ("ai-2", Unit::ai("pong $ai_1")),
        ],
        &[("ai-1", "ai-2"), ("ai-2", "ai-1")],
    );
    for mode in [RunMode::Sequential, RunMode::Parallel] {
        let mock = Arc::new(MockCompletion::echo());
        let report = engine(&mock, mode).run(&g).await.unwrap();

        assert!(report.cyclic);
        assert_eq!(mock.calls(), 2, "mode {}", mode);
        assert_eq!(report.order, vec![id("ai-1"), id("ai-2")]);
        assert_eq!(report.value("ai-1"), Some("ping $ai_2"));
        assert_eq!(report.value("ai-2"), Some("pong ping $ai_2"));
        assert_eq!(report.levels[&id("ai-1")], 0);
        assert_eq!(report.levels[&id("ai-2")], 1);
        assert!(report.skipped.is_empty());
    }
}

/// **Scenario**: A cycle fed by an input: the input runs in wave 0, the blocked cycle is
/// released at its first member, and values flow on to the output.
#[tokio::test]
async fn fed_cycle_releases_first_member() {
    let g = graph(
        vec![
            ("input-1", Unit::input("hello")),
            ("ai-1", Unit::ai("Say $input_1")),
            ("ai-2", Unit::ai("$ai_1!")),
            ("output-1", Unit::output()),
        ],
        &[
            ("input-1", "ai-1"),
            ("ai-1", "ai-2"),
            ("ai-2", "ai-1"),
            ("ai-2", "output-1"),
        ],
    );
    for mode in [RunMode::Sequential, RunMode::Parallel] {
        let mock = Arc::new(MockCompletion::uppercase());
        let report = engine(&mock, mode).run(&g).await.unwrap();

        assert!(report.cyclic);
        assert_eq!(report.value("output-1"), Some("SAY HELLO!"), "mode {}", mode);
        assert_eq!(mock.calls(), 2);
        let levels: Vec<usize> = ["input-1", "ai-1", "ai-2", "output-1"]
            .iter()
            .map(|n| report.levels[&id(n)])
            .collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }
}

/// **Scenario**: A self-loop makes the graph cyclic; the node runs once and its own
/// delivery does not dispatch it again.
#[tokio::test]
async fn self_loop_runs_once() {
    let g = graph(vec![("ai-1", Unit::ai("again $ai_1"))], &[("ai-1", "ai-1")]);
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert!(report.cyclic);
    assert_eq!(mock.calls(), 1);
    assert_eq!(report.value("ai-1"), Some("again $ai_1"));
    assert_eq!(report.received[&id("ai-1")].len(), 1);
}

/// **Scenario**: Nodes with no inputs share wave 0 and their successors share wave 1.
#[tokio::test]
async fn independent_roots_share_a_wave() {
    let g = graph(
        vec![
            ("input-1", Unit::input("a")),
            ("input-2", Unit::input("b")),
            ("output-1", Unit::output()),
            ("output-2", Unit::output()),
            ("custom-1", Unit::custom("'loop'")),
        ],
        &[
            ("input-1", "output-1"),
            ("input-2", "output-2"),
            ("custom-1", "custom-1"),
        ],
    );
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert!(report.cyclic);
    assert_eq!(report.levels[&id("input-1")], 0);
    assert_eq!(report.levels[&id("input-2")], 0);
    assert_eq!(report.levels[&id("output-1")], 1);
    assert_eq!(report.levels[&id("output-2")], 1);
    assert_eq!(report.levels[&id("custom-1")], 2);
    assert_eq!(report.value("output-2"), Some("b"));
    assert_eq!(report.order.len(), 5);
}

/// **Scenario**: In parallel cyclic runs a failed node stops its branch; nodes it feeds
/// are never released, other nodes still run.
#[tokio::test]
async fn parallel_cycle_failure_blocks_downstream() {
    let g = graph(
        vec![
            ("ai-1", Unit::ai("boom $ai_2")),
            ("ai-2", Unit::ai("$ai_1")),
            ("input-1", Unit::input("ok")),
            ("output-1", Unit::output()),
        ],
        &[("ai-1", "ai-2"), ("ai-2", "ai-1"), ("input-1", "output-1")],
    );
    let mock = Arc::new(MockCompletion::echo().with_fail_on("boom"));
    let report = engine(&mock, RunMode::Parallel).run(&g).await.unwrap();
    assert_eq!(report.value("output-1"), Some("ok"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.skipped, vec![id("ai-2")]);
    assert_eq!(mock.calls(), 1);
}

/// `custom-1` and `input-1` form wave 0; the `ai-1 <-> ai-2` cycle and `output-1` come later.
fn cancel_wave_graph() -> Graph {
    graph(
        vec![
            ("custom-1", Unit::custom("'done'")),
            ("input-1", Unit::input("x")),
            ("ai-1", Unit::ai("$ai_2")),
            ("ai-2", Unit::ai("$ai_1")),
            ("output-1", Unit::output()),
        ],
        &[("ai-1", "ai-2"), ("ai-2", "ai-1"), ("input-1", "output-1")],
    )
}

/// **Scenario**: A sequential wave stops at the node that cancels; later members of the
/// same wave never start.
#[tokio::test]
async fn sequential_cancel_stops_mid_wave() {
    let cancel = CancellationFlag::new();
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential)
        .with_evaluator(cancelling_evaluator(&cancel))
        .run_with_cancel(&cancel_wave_graph(), &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.order, vec![id("custom-1")]);
    assert_eq!(report.value("custom-1"), Some("done"));
    assert_eq!(
        report.skipped,
        vec![id("input-1"), id("ai-1"), id("ai-2"), id("output-1")]
    );
    assert_eq!(report.levels.len(), 1);
    assert_eq!(mock.calls(), 0);
}

/// **Scenario**: A parallel wave that was already dispatched finishes, and no further
/// wave starts after the flag is set.
#[tokio::test]
async fn parallel_cancel_finishes_wave_then_stops() {
    let cancel = CancellationFlag::new();
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Parallel)
        .with_evaluator(cancelling_evaluator(&cancel))
        .run_with_cancel(&cancel_wave_graph(), &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.value("custom-1"), Some("done"));
    assert_eq!(report.value("input-1"), Some("x"));
    assert_eq!(report.skipped, vec![id("ai-1"), id("ai-2"), id("output-1")]);
    assert_eq!(report.levels[&id("input-1")], 0);
    assert_eq!(mock.calls(), 0);
}
