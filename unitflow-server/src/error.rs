//! Route errors and their JSON responses: `{ "error": message }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use unitflow::{DocumentError, EngineError, GraphError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The request's graph document could not be turned into a graph.
    #[error("{0}")]
    BadGraph(#[from] DocumentError),
    /// The graph is structurally unusable for compilation.
    #[error("{0}")]
    Graph(#[from] GraphError),
    /// The run was refused before any node executed.
    #[error("{0}")]
    Refused(#[from] EngineError),
    /// The chat provider could not be reached or sent an unreadable reply.
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadGraph(_) | ServerError::Graph(_) => StatusCode::BAD_REQUEST,
            ServerError::Refused(EngineError::MissingCredential)
            | ServerError::Refused(EngineError::StructuralInconsistency(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Refused(_) | ServerError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
