//! `POST /api/export`: compile a graph document to pipeline program text.

use axum::Json;
use serde::{Deserialize, Serialize};
use unitflow::{GraphDocument, PipelineCompiler};

use crate::ServerError;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub graph: GraphDocument,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub program: String,
}

pub async fn export(Json(req): Json<ExportRequest>) -> Result<Json<ExportResponse>, ServerError> {
    let graph = req.graph.into_graph()?;
    let program = PipelineCompiler::new().export(&graph)?;
    Ok(Json(ExportResponse { program }))
}
