//! HTTP service for the unitflow editor.
//!
//! Routes:
//!
//! - `POST /api/chat`: one chat completion, proxied to the provider as-is.
//! - `POST /api/run`: run a graph document, return every value.
//! - `POST /api/run/stream`: run a graph document, stream run events as SSE.
//! - `POST /api/export`: compile a graph document to a pipeline program.

mod config;
mod error;
mod logging;
mod routes;

use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use unitflow::{ChatCompletion, CompletionClient};

pub use config::ServerConfig;
pub use error::ServerError;
pub use logging::{init_tracing, load_dotenv};
pub use routes::{ChatProxy, ChatRequest, ExportRequest, RunRequest, RunResponse};

/// Shared state for all routes.
pub struct AppState {
    /// Client used by graph runs for ai units.
    pub completion: Arc<dyn CompletionClient>,
    /// Forwarder for `/api/chat`.
    pub chat: ChatProxy,
    /// Used when a request carries no api key of its own.
    pub default_api_key: Option<String>,
}

impl AppState {
    /// State for `config`: OpenAI-compatible completions for runs, the same endpoints for
    /// the chat proxy.
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let completion = ChatCompletion::new()
            .with_standard(config.standard.clone())
            .with_reasoner(config.reasoner.clone())
            .with_temperature(config.temperature);
        Ok(Self {
            completion: Arc::new(completion),
            chat: ChatProxy::new(
                config.standard.clone(),
                config.reasoner.clone(),
                config.temperature,
            )?,
            default_api_key: config.api_key.clone(),
        })
    }
}

/// Router with all routes, permissive CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(routes::chat))
        .route("/api/run", post(routes::run))
        .route("/api/run/stream", post(routes::run_stream))
        .route("/api/export", post(routes::export))
        .layer(
            TraceLayer::new_for_http().make_span_with(
                |req: &axum::http::Request<axum::body::Body>| {
                    info_span!("request", method = %req.method(), uri = %req.uri())
                },
            ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
