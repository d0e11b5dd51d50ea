//! Acyclic runs in sequential mode.

use std::sync::Arc;

use unitflow::{
    CancellationFlag, Engine, EngineError, MockCompletion, RemoteCallError, RunMode, Unit,
    USER_CODE_ERROR,
};

use crate::common::{cancelling_evaluator, engine, graph, hello_chain, id};

/// **Scenario**: input "hello" -> ai "Say $input_1 loudly" -> output, with an
/// upper-casing client, ends with "SAY HELLO LOUDLY" at the output.
#[tokio::test]
async fn hello_chain_reaches_output() {
    let mock = Arc::new(MockCompletion::uppercase());
    let report = engine(&mock, RunMode::Sequential)
        .run(&hello_chain())
        .await
        .unwrap();

    assert!(!report.cyclic);
    assert_eq!(report.value("output-1"), Some("SAY HELLO LOUDLY"));
    assert_eq!(report.outputs().len(), 1);
    assert_eq!(mock.prompts(), vec!["Say hello loudly".to_string()]);
    assert_eq!(report.order, vec![id("input-1"), id("ai-1"), id("output-1")]);
    assert!(report.into_result().is_ok());
}

/// **Scenario**: input "X" holding "hello" -> ai "Say $input_X loudly" -> output; the ai
/// node and the output both end with "SAY HELLO LOUDLY".
#[tokio::test]
async fn bare_input_id_feeds_template() {
    let g = graph(
        vec![
            ("X", Unit::input("hello")),
            ("ai-1", Unit::ai("Say $input_X loudly")),
            ("output-1", Unit::output()),
        ],
        &[("X", "ai-1"), ("ai-1", "output-1")],
    );
    let mock = Arc::new(MockCompletion::uppercase());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();

    assert_eq!(mock.prompts(), vec!["Say hello loudly".to_string()]);
    assert_eq!(report.value("ai-1"), Some("SAY HELLO LOUDLY"));
    assert_eq!(report.value("output-1"), Some("SAY HELLO LOUDLY"));
}

/// **Scenario**: Two inputs producing "a" and "b" join at the output as "a\nb".
#[tokio::test]
async fn output_joins_in_edge_order() {
    let g = graph(
        vec![
            ("input-1", Unit::input("a")),
            ("input-2", Unit::input("b")),
            ("output-1", Unit::output()),
        ],
        &[("input-1", "output-1"), ("input-2", "output-1")],
    );
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert_eq!(report.value("output-1"), Some("a\nb"));
    assert_eq!(report.received[&id("output-1")].len(), 2);
}

/// **Scenario**: An input unit with incoming edges ignores its own value and forwards
/// the join; parallel edges deliver once each.
#[tokio::test]
async fn input_with_edges_joins_and_duplicates_deliver_twice() {
    let g = graph(
        vec![
            ("input-1", Unit::input("x")),
            ("input-2", Unit::input("ignored")),
            ("output-1", Unit::output()),
        ],
        &[
            ("input-1", "input-2"),
            ("input-1", "input-2"),
            ("input-2", "output-1"),
        ],
    );
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert_eq!(report.value("input-2"), Some("x\nx"));
    assert_eq!(report.value("output-1"), Some("x\nx"));
}

/// **Scenario**: An output unit with no inputs keeps its own text and still forwards it.
#[tokio::test]
async fn output_without_inputs_forwards_its_text() {
    let g = graph(
        vec![
            ("output-1", Unit::new(unitflow::UnitKind::Output, "idle")),
            ("output-2", Unit::output()),
        ],
        &[("output-1", "output-2")],
    );
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert_eq!(report.value("output-1"), Some("idle"));
    assert_eq!(report.value("output-2"), Some("idle"));
}

/// **Scenario**: Tokens of units that did not deliver stay verbatim; `$input_1` does not
/// match inside `$input_10`.
#[tokio::test]
async fn unmatched_tokens_stay_verbatim() {
    let g = graph(
        vec![
            ("input-1", Unit::input("v")),
            ("ai-1", Unit::ai("$input_1|$input_10|$input_9")),
        ],
        &[("input-1", "ai-1")],
    );
    let mock = Arc::new(MockCompletion::echo());
    engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert_eq!(mock.prompts(), vec!["v|$input_10|$input_9".to_string()]);
}

/// **Scenario**: Custom code receives upstream values as quoted literals and by name.
#[tokio::test]
async fn custom_unit_evaluates_substituted_code() {
    let g = graph(
        vec![
            ("input-1", Unit::input("he said \"hi\"")),
            ("custom-1", Unit::custom("return upper($input_1) + '/' + inputs.input_1;")),
            ("output-1", Unit::output()),
        ],
        &[("input-1", "custom-1"), ("custom-1", "output-1")],
    );
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert_eq!(
        report.value("output-1"),
        Some("HE SAID \"HI\"/he said \"hi\"")
    );
    assert_eq!(mock.calls(), 0);
}

/// **Scenario**: Failing custom code yields the sentinel and the run continues.
#[tokio::test]
async fn custom_error_is_sentinel_not_failure() {
    let g = graph(
        vec![
            ("custom-1", Unit::custom("inputs.missing")),
            ("output-1", Unit::output()),
        ],
        &[("custom-1", "output-1")],
    );
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential).run(&g).await.unwrap();
    assert_eq!(report.value("output-1"), Some(USER_CODE_ERROR));
    assert!(report.is_success());
}

/// **Scenario**: Pathologically nested custom code becomes the sentinel instead of
/// exhausting the stack; an unrelated branch still runs.
#[tokio::test]
async fn deeply_nested_custom_code_is_sentinel() {
    let code = format!("{}'x'{}", "(".repeat(100_000), ")".repeat(100_000));
    let g = graph(
        vec![
            ("custom-1", Unit::custom(code)),
            ("output-1", Unit::output()),
            ("input-1", Unit::input("still here")),
            ("output-2", Unit::output()),
        ],
        &[("custom-1", "output-1"), ("input-1", "output-2")],
    );
    for mode in [RunMode::Sequential, RunMode::Parallel] {
        let mock = Arc::new(MockCompletion::echo());
        let report = engine(&mock, mode).run(&g).await.unwrap();
        assert_eq!(report.value("custom-1"), Some(USER_CODE_ERROR));
        assert_eq!(report.value("output-1"), Some(USER_CODE_ERROR));
        assert_eq!(report.value("output-2"), Some("still here"));
        assert!(report.is_success());
    }
}

/// **Scenario**: In sequential mode a failed remote call forwards its error marker
/// downstream and surfaces one aggregate failure.
#[tokio::test]
async fn remote_failure_forwards_marker() {
    let mock = Arc::new(MockCompletion::failing(RemoteCallError::with_status(
        401, "bad key",
    )));
    let report = engine(&mock, RunMode::Sequential)
        .run(&hello_chain())
        .await
        .unwrap();
    let marker = "Error: remote call failed (401): bad key";
    assert_eq!(report.value("ai-1"), Some(marker));
    assert_eq!(report.value("output-1"), Some(marker));
    assert!(report.skipped.is_empty());

    match report.into_result() {
        Err(EngineError::BranchFailed { failures }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].node, id("ai-1"));
            assert_eq!(failures[0].status, Some(401));
        }
        other => panic!("expected BranchFailed, got {:?}", other),
    }
}

/// **Scenario**: A graph with ai units and no api key is refused before any node runs.
#[tokio::test]
async fn missing_credential_runs_nothing() {
    let mock = Arc::new(MockCompletion::uppercase());
    let result = Engine::new(mock.clone()).run(&hello_chain()).await;
    assert!(matches!(result, Err(EngineError::MissingCredential)));
    assert_eq!(mock.calls(), 0);
}

/// **Scenario**: Running leaves the graph untouched, so a second run gives the same result.
#[tokio::test]
async fn rerun_gives_same_result() {
    let g = hello_chain();
    let mock = Arc::new(MockCompletion::uppercase());
    let engine = engine(&mock, RunMode::Sequential);
    let first = engine.run(&g).await.unwrap();
    assert!(g.verify().is_ok());
    assert_eq!(g.node(&id("output-1")).unwrap().ready_count(), 1);
    let second = engine.run(&g).await.unwrap();
    assert_eq!(first.values, second.values);
}

/// **Scenario**: Cancelling during a node stops dispatch; the running node's output is kept.
#[tokio::test]
async fn cancellation_stops_further_dispatch() {
    let g = graph(
        vec![
            ("input-1", Unit::input("x")),
            ("custom-1", Unit::custom("'done'")),
            ("output-1", Unit::output()),
        ],
        &[("input-1", "custom-1"), ("custom-1", "output-1")],
    );
    let cancel = CancellationFlag::new();
    let mock = Arc::new(MockCompletion::echo());
    let report = engine(&mock, RunMode::Sequential)
        .with_evaluator(cancelling_evaluator(&cancel))
        .run_with_cancel(&g, &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.value("custom-1"), Some("done"));
    assert_eq!(report.skipped, vec![id("output-1")]);
    assert!(matches!(report.into_result(), Err(EngineError::Cancelled)));
}
