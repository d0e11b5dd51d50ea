//! Run entry points: run a saved graph with env config plus overrides, export it as a
//! pipeline program, or describe its schedule.
//!
//! Re-exports [`run_with_config`], [`build_engine`] and [`Error`].

pub use crate::config::Error;

mod client;
mod config_summary;
mod inputs;
mod inspect;
mod run_with_config;

use std::path::Path;

use unitflow::{Graph, GraphDocument, PipelineCompiler, RunReport};

use crate::config::{RunConfig, RunOptions};

pub use client::build_engine;
pub use config_summary::{config_summary, print_config_summary};
pub use inputs::{apply_inputs, parse_input};
pub use inspect::inspect;
pub use run_with_config::run_with_config;

/// Reads a saved graph document and builds the live graph.
pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph, Error> {
    Ok(GraphDocument::load(path)?.into_graph()?)
}

/// Runs the graph at `path` with config from env and `options` applied on top.
///
/// Loads `.env`, overrides input unit values from `inputs` (`(id, value)` pairs), then
/// calls [`run_with_config`].
pub async fn run_graph(
    path: impl AsRef<Path>,
    inputs: &[(String, String)],
    options: &RunOptions,
) -> Result<RunReport, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    let mut graph = load_graph(path)?;
    apply_inputs(&mut graph, inputs)?;
    run_with_config(&config, &graph).await
}

/// Compiles the graph at `path` to pipeline program text; writes it to `out` when given.
pub fn export_graph(path: impl AsRef<Path>, out: Option<&Path>) -> Result<String, Error> {
    let graph = load_graph(path)?;
    let program = PipelineCompiler::new().export(&graph)?;
    if let Some(out) = out {
        std::fs::write(out, &program)?;
    }
    Ok(program)
}

/// Describes the graph at `path` without running it.
pub fn inspect_graph(path: impl AsRef<Path>) -> Result<String, Error> {
    Ok(inspect(&load_graph(path)?))
}

/// One `id: value` line per output unit, in id order.
pub fn format_outputs(report: &RunReport) -> String {
    report
        .outputs()
        .iter()
        .map(|(id, value)| format!("{}: {}", id, value))
        .collect::<Vec<_>>()
        .join("\n")
}
