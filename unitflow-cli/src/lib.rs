//! unitflow-cli library: load a saved graph, run it with env config, export or inspect it.
//!
//! Reads provider config from `.env`/env vars, applies CLI overrides and runs the graph
//! with the unitflow engine.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), unitflow_cli::Error> {
//! let options = unitflow_cli::RunOptions::default();
//! let report = unitflow_cli::run_graph("graph.json", &[], &options).await?;
//! println!("{}", unitflow_cli::format_outputs(&report));
//! # Ok(())
//! # }
//! ```

mod config;
mod observer;
mod run;

pub use config::{Error, RunConfig, RunOptions};
pub use observer::{describe, RunObserver};
pub use run::{
    apply_inputs, build_engine, config_summary, export_graph, format_outputs, inspect,
    inspect_graph, load_graph, parse_input, print_config_summary, run_graph, run_with_config,
};
pub use unitflow::{RunMode, RunReport};

#[cfg(test)]
mod tests;
