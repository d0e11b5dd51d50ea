//! `POST /api/run` and `POST /api/run/stream`: run a graph document.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt};
use unitflow::{
    CancellationFlag, Credentials, Engine, GraphDocument, ModelSelector, NodeFailure, NodeId,
    RunEvent, RunMode, RunReport,
};

use crate::{AppState, ServerError};

/// Body of `/api/run` and `/api/run/stream`.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub graph: GraphDocument,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default, rename = "useR1")]
    pub use_r1: bool,
}

/// Result of `/api/run`.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    /// Values of output units.
    pub outputs: BTreeMap<NodeId, String>,
    /// Value of every node that produced one.
    pub nodes: BTreeMap<NodeId, String>,
    pub failures: Vec<NodeFailure>,
    pub cancelled: bool,
}

impl From<RunReport> for RunResponse {
    fn from(report: RunReport) -> Self {
        Self {
            outputs: report.outputs(),
            nodes: report.values,
            failures: report.failures,
            cancelled: report.cancelled,
        }
    }
}

fn engine_for(state: &AppState, req: &RunRequest) -> Engine {
    let model = if req.use_r1 {
        ModelSelector::Reasoner
    } else {
        ModelSelector::Standard
    };
    let engine = Engine::new(Arc::clone(&state.completion))
        .with_mode(req.mode)
        .with_model(model);
    let key = req
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.default_api_key.clone());
    match key {
        Some(key) => engine.with_credentials(Credentials::new(key)),
        None => engine,
    }
}

pub async fn run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, ServerError> {
    let engine = engine_for(&state, &req);
    let graph = req.graph.into_graph()?;
    let report = engine.run(&graph).await?;
    tracing::info!(
        executed = report.order.len(),
        failed = report.failures.len(),
        "graph run finished"
    );
    Ok(Json(report.into()))
}

/// Cancels the run when the response stream is dropped (client went away).
struct CancelOnDrop(CancellationFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn event_name(event: &RunEvent) -> &'static str {
    match event {
        RunEvent::RunStarted { .. } => "run_started",
        RunEvent::Wave { .. } => "wave",
        RunEvent::NodeStarted { .. } => "node_started",
        RunEvent::NodeFinished { .. } => "node_finished",
        RunEvent::NodeFailed { .. } => "node_failed",
        RunEvent::RunFinished { .. } => "run_finished",
        RunEvent::RunFailed { .. } => "run_failed",
    }
}

fn to_sse(event: &RunEvent) -> Event {
    let sse = Event::default().event(event_name(event));
    match serde_json::to_string(event) {
        Ok(data) => sse.data(data),
        Err(e) => sse.data(serde_json::json!({ "error": e.to_string() }).to_string()),
    }
}

/// Streams run events as SSE. Refused runs get a 400 before the stream starts.
pub async fn run_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let engine = engine_for(&state, &req);
    let graph = req.graph.into_graph()?;
    engine.preflight(&graph)?;

    let cancel = CancellationFlag::new();
    let guard = CancelOnDrop(cancel.clone());
    let events = engine.stream(graph, cancel).map(move |event| {
        let _ = &guard;
        Ok(to_sse(&event))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
