//! unitflow binary: run, export or inspect a saved graph document.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use unitflow_cli::{
    export_graph, format_outputs, inspect_graph, parse_input, run_graph, RunMode, RunOptions,
};

#[derive(Parser, Debug)]
#[command(name = "unitflow")]
#[command(about = "Run dataflow graphs of input, ai, custom and output units")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a graph and print the value of every output unit.
    Run {
        /// Saved graph document (JSON).
        graph: PathBuf,

        /// Scheduler mode: sequential or parallel.
        #[arg(long, value_name = "MODE")]
        mode: Option<RunMode>,

        /// Send ai units to the reasoning model.
        #[arg(long)]
        reasoner: bool,

        /// Sampling temperature (0–2).
        #[arg(long, value_name = "T")]
        temperature: Option<f32>,

        /// Print node enter/exit to stderr.
        #[arg(short, long)]
        verbose: bool,

        /// Override an input unit's value; repeatable.
        #[arg(short, long = "input", value_name = "ID=VALUE", value_parser = parse_input)]
        inputs: Vec<(String, String)>,
    },
    /// Compile a graph to a pipeline program.
    Export {
        graph: PathBuf,

        /// Write the program here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Describe a graph: cyclic or acyclic, schedule and tokens.
    Inspect { graph: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::Run {
            graph,
            mode,
            reasoner,
            temperature,
            verbose,
            inputs,
        } => {
            let options = RunOptions {
                mode,
                reasoner,
                temperature,
                verbose,
            };
            let report = match run_graph(&graph, &inputs, &options).await {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            let outputs = format_outputs(&report);
            if !outputs.is_empty() {
                println!("{}", outputs);
            }
            if let Err(e) = report.into_result() {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Export { graph, output } => match export_graph(&graph, output.as_deref()) {
            Ok(program) => {
                if output.is_none() {
                    print!("{}", program);
                }
            }
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        },
        Command::Inspect { graph } => match inspect_graph(&graph) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
