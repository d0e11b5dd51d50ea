//! `POST /api/chat`: forwards one prompt to the chat provider and returns its JSON.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use unitflow::Endpoint;

use crate::{AppState, ServerError};

/// Body of `/api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
    /// Send to the reasoning model instead of the standard chat model.
    #[serde(default, rename = "useR1")]
    pub use_r1: bool,
}

/// Plain HTTP forwarder to an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatProxy {
    http: reqwest::Client,
    standard: Endpoint,
    reasoner: Endpoint,
    temperature: f32,
}

impl ChatProxy {
    pub fn new(
        standard: Endpoint,
        reasoner: Endpoint,
        temperature: f32,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            http,
            standard,
            reasoner,
            temperature,
        })
    }

    pub fn endpoint(&self, use_r1: bool) -> &Endpoint {
        if use_r1 {
            &self.reasoner
        } else {
            &self.standard
        }
    }

    /// Sends `prompt` as a single user message. Returns the provider's status,
    /// content type and body.
    pub async fn forward(
        &self,
        prompt: &str,
        api_key: &str,
        use_r1: bool,
    ) -> Result<(StatusCode, Option<HeaderValue>, bytes::Bytes), reqwest::Error> {
        let endpoint = self.endpoint(use_r1);
        let url = format!("{}/chat/completions", endpoint.api_base.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": endpoint.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        });
        let res = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status =
            StatusCode::from_u16(res.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok());
        let bytes = res.bytes().await?;
        tracing::debug!(model = %endpoint.model, status = %status, bytes = bytes.len(), "chat response");
        Ok((status, content_type, bytes))
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ServerError> {
    let api_key = req
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.default_api_key.clone())
        .unwrap_or_default();
    let (status, content_type, body) = state.chat.forward(&req.prompt, &api_key, req.use_r1).await?;

    let mut response = (status, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        content_type.unwrap_or_else(|| HeaderValue::from_static("application/json")),
    );
    Ok(response)
}
