//! Route handlers.

mod chat;
mod export;
mod run;

pub use chat::{chat, ChatProxy, ChatRequest};
pub use export::{export, ExportRequest};
pub use run::{run, run_stream, RunRequest, RunResponse};
