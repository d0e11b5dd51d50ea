//! Graph execution engine.
//!
//! [`Engine::run`] checks the graph (structure, credentials), classifies it with the
//! cycle detector and hands it to a scheduler:
//!
//! | graph   | `RunMode::Sequential`          | `RunMode::Parallel`             |
//! |---------|--------------------------------|---------------------------------|
//! | acyclic | topological order, one by one  | branch fan-out                  |
//! | cyclic  | waves, one node at a time      | waves, each wave concurrently   |
//!
//! Per-run counters live in [`RunState`]; the graph is never mutated by a run.

mod events;
mod logging;
mod parallel;
mod plan;
mod processor;
mod propagate;
mod report;
mod run_context;
mod sequential;
mod step;
mod symbols;
mod waves;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::evaluator::{CodeEvaluator, ExprEvaluator};
use crate::graph::{has_cycle, Graph, UnitKind};
use crate::llm::{CompletionClient, Credentials, ModelSelector};

pub use crate::error::{EngineError, NodeFailure};
pub use events::RunEvent;
pub use plan::wave_plan;
pub use processor::{error_marker, join_values, JOIN_SEPARATOR};
pub use propagate::transmit;
pub use report::RunReport;
pub use run_context::{Arrival, CancellationFlag, RunContext, RunState};
pub use symbols::SymbolTable;

use logging::{log_cancelled, log_run_complete, log_run_error, log_run_start};

/// Ordering discipline for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One node at a time; deterministic global order.
    #[default]
    Sequential,
    /// Independent branches run concurrently.
    Parallel,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Sequential => f.write_str("sequential"),
            RunMode::Parallel => f.write_str("parallel"),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            _ => Err(format!(
                "unknown run mode: {} (use sequential or parallel)",
                s
            )),
        }
    }
}

/// Runs graphs against a completion client and a code evaluator.
///
/// **Interaction**: Built once by the CLI or server; each `run` creates its own
/// [`RunState`], so one engine can run many graphs concurrently.
#[derive(Clone)]
pub struct Engine {
    completion: Arc<dyn CompletionClient>,
    evaluator: Arc<dyn CodeEvaluator>,
    credentials: Option<Credentials>,
    model: ModelSelector,
    mode: RunMode,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("credentials", &self.credentials)
            .field("model", &self.model)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Sequential engine with the built-in expression evaluator and no credentials.
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            completion,
            evaluator: Arc::new(ExprEvaluator),
            credentials: None,
            model: ModelSelector::default(),
            mode: RunMode::default(),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn CodeEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_model(mut self, model: ModelSelector) -> Self {
        self.model = model;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn model(&self) -> ModelSelector {
        self.model
    }

    /// Checks that the graph can be run. Returns whether it is cyclic.
    ///
    /// Fails with `StructuralInconsistency` on a dangling edge or a readyCount that
    /// disagrees with the edge list, and with `MissingCredential` when ai units exist
    /// but no usable api key is set.
    pub fn preflight(&self, graph: &Graph) -> Result<bool, EngineError> {
        graph.verify()?;
        let has_key = self.credentials.as_ref().is_some_and(|c| !c.is_blank());
        if graph.has_kind(UnitKind::Ai) && !has_key {
            return Err(EngineError::MissingCredential);
        }
        Ok(has_cycle(graph))
    }

    /// Runs the graph to completion.
    pub async fn run(&self, graph: &Graph) -> Result<RunReport, EngineError> {
        self.run_with_cancel(graph, &CancellationFlag::new()).await
    }

    /// Runs the graph, stopping dispatch once `cancel` is set.
    ///
    /// Calls already in flight finish; their outputs are kept in the report, which
    /// has `cancelled` set when some node never started.
    pub async fn run_with_cancel(
        &self,
        graph: &Graph,
        cancel: &CancellationFlag,
    ) -> Result<RunReport, EngineError> {
        self.execute(graph, cancel.clone(), None).await
    }

    /// Streams run events. The last event is `RunFinished` or `RunFailed`.
    pub fn stream(&self, graph: Graph, cancel: CancellationFlag) -> ReceiverStream<RunEvent> {
        let (tx, rx) = mpsc::channel(128);
        let engine = self.clone();

        tokio::spawn(async move {
            let last = match engine.execute(&graph, cancel, Some(tx.clone())).await {
                Ok(report) => RunEvent::RunFinished {
                    report: Box::new(report),
                },
                Err(e) => RunEvent::RunFailed {
                    error: e.to_string(),
                },
            };
            let _ = tx.send(last).await;
        });

        ReceiverStream::new(rx)
    }

    async fn execute(
        &self,
        graph: &Graph,
        cancel: CancellationFlag,
        events: Option<mpsc::Sender<RunEvent>>,
    ) -> Result<RunReport, EngineError> {
        let cyclic = self.preflight(graph).inspect_err(log_run_error)?;

        let ctx = RunContext {
            completion: Arc::clone(&self.completion),
            evaluator: Arc::clone(&self.evaluator),
            credentials: self.credentials.clone(),
            model: self.model,
            cancel,
            events,
        };
        log_run_start(graph.len(), cyclic, self.mode);
        ctx.emit(RunEvent::RunStarted {
            nodes: graph.len(),
            cyclic,
            mode: self.mode,
        })
        .await;

        let state = RunState::new(graph);
        let levels = if cyclic {
            sequential::run_waves(graph, &state, &ctx, self.mode).await
        } else {
            match self.mode {
                RunMode::Sequential => sequential::run_topological(graph, &state, &ctx).await,
                RunMode::Parallel => parallel::run_branches(graph, &state, &ctx).await,
            }
            Default::default()
        };

        let executed = state.executed();
        let cancelled = ctx.cancel.is_cancelled() && executed < graph.len();
        if cancelled {
            log_cancelled(executed);
        }
        let report = RunReport::collect(graph, &state, cyclic, self.mode, levels, cancelled);
        log_run_complete(executed, report.failures.len());
        Ok(report)
    }
}
