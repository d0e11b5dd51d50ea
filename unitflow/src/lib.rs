//! # unitflow
//!
//! A dataflow graph engine. A graph holds typed units (input, output, ai, custom)
//! connected by directed edges; running it pushes values from sources to sinks, calling
//! a remote completion service for ai units and a code evaluator for custom units.
//!
//! ## Design Principles
//!
//! - **Readiness counters**: every node tracks how many inputs are still outstanding;
//!   it runs when that count reaches zero. The graph store keeps the count equal to the
//!   in-degree; each run works on its own copy.
//! - **Two schedulers**: acyclic graphs run in topological order (or branch-parallel);
//!   cyclic graphs run in waves so every node still runs exactly once.
//! - **Substitution by token**: a node refers to an upstream value as `$<kind>_<suffix>`
//!   (e.g. `$input_1`); replaced text is never rescanned.
//! - **Compile or interpret**: the same graph can be run by the [`engine`] or compiled by
//!   the [`compiler`] into a pipeline program with identical outputs.
//!
//! ## Main Modules
//!
//! - [`graph`]: `Graph`, `Node`, `Unit`, cycle detection, topological order, documents.
//! - [`engine`]: `Engine`, `RunMode`, `RunReport`, `RunEvent`, cancellation.
//! - [`compiler`]: `PipelineCompiler` and the pipeline `Program` runtime.
//! - [`template`]: token substitution.
//! - [`llm`]: `CompletionClient` trait, `MockCompletion`, `ChatCompletion` (feature `openai`).
//! - [`evaluator`]: `CodeEvaluator` trait and the built-in `ExprEvaluator`.
//!
//! ## Features
//!
//! - `openai` (default): OpenAI-compatible chat completions via `async-openai`.
//! - `tracing` (default): structured logs via `tracing`; otherwise stderr lines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unitflow::{Credentials, Engine, Graph, MockCompletion, Unit};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut graph = Graph::new();
//! graph.add_node("input-1", Unit::input("hello")).unwrap();
//! graph.add_node("ai-1", Unit::ai("Say $input_1 loudly")).unwrap();
//! graph.add_node("output-1", Unit::output()).unwrap();
//! graph.add_edge("input-1", "ai-1").unwrap();
//! graph.add_edge("ai-1", "output-1").unwrap();
//!
//! let engine = Engine::new(Arc::new(MockCompletion::uppercase()))
//!     .with_credentials(Credentials::new("sk-test"));
//! let report = engine.run(&graph).await.unwrap();
//! assert_eq!(report.value("output-1"), Some("SAY HELLO LOUDLY"));
//! # }
//! ```

pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod llm;
pub mod template;

pub use compiler::{PipelineCompiler, Program, ProgramParseError, ProgramRunError};
pub use engine::{wave_plan, CancellationFlag, Engine, RunEvent, RunMode, RunReport};
pub use error::{EngineError, NodeFailure};
pub use evaluator::{CodeEvaluator, ExprEvaluator, UserCodeError, USER_CODE_ERROR};
pub use graph::{
    has_cycle, topological_order, DocumentError, Edge, Graph, GraphDocument, GraphError, Node,
    NodeId, Position, Token, Unit, UnitKind,
};
pub use llm::{CompletionClient, Credentials, MockCompletion, ModelSelector, RemoteCallError};
pub use template::{substitute, Quoting};

#[cfg(feature = "openai")]
pub use llm::{ChatCompletion, Endpoint};
