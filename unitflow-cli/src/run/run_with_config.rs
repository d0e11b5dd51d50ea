//! Run a graph with a given config; does not read .env.
//!
//! Builds the engine via [`build_engine`](super::build_engine). In verbose mode the run is
//! streamed and every event goes through a [`RunObserver`] on stderr. Ctrl-C stops further
//! dispatch; nodes already running finish and the report comes back with `cancelled` set.

use tokio_stream::StreamExt;
use unitflow::{CancellationFlag, Graph, RunEvent, RunReport};

use crate::config::RunConfig;
use crate::observer::RunObserver;

use super::{build_engine, print_config_summary, Error};

/// Run `graph` with `config` and return the run report.
///
/// Node failures are part of the report; `Err` means the run was refused (malformed
/// graph, missing credential).
pub async fn run_with_config(config: &RunConfig, graph: &Graph) -> Result<RunReport, Error> {
    let engine = build_engine(config);
    let cancel = CancellationFlag::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());

    let result = if config.verbose {
        print_config_summary(config);
        let mut observer = RunObserver::stderr();
        let mut events = engine.stream(graph.clone(), cancel);
        let mut outcome: Result<RunReport, Error> = Err("run ended without a result".into());
        while let Some(event) = events.next().await {
            observer.observe(&event);
            match event {
                RunEvent::RunFinished { report } => outcome = Ok(*report),
                RunEvent::RunFailed { error } => outcome = Err(error.into()),
                _ => {}
            }
        }
        outcome
    } else {
        engine
            .run_with_cancel(graph, &cancel)
            .await
            .map_err(|e| Box::new(e) as Error)
    };

    watcher.abort();
    result
}

fn cancel_on_ctrl_c(cancel: CancellationFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupted; waiting for running units to finish");
            cancel.cancel();
        }
    })
}
