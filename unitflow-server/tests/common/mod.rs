#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use unitflow::{Endpoint, MockCompletion};
use unitflow_server::{app, AppState, ChatProxy};

/// Router over `completion`; the chat proxy points at a closed local port.
pub fn router(completion: MockCompletion, default_api_key: Option<&str>) -> Router {
    let chat = ChatProxy::new(
        Endpoint::new("http://127.0.0.1:1/v1", "gpt-4o"),
        Endpoint::new("http://127.0.0.1:1", "deepseek-reasoner"),
        0.7,
    )
    .unwrap();
    app(Arc::new(AppState {
        completion: Arc::new(completion),
        chat,
        default_api_key: default_api_key.map(str::to_string),
    }))
}

pub fn hello_chain() -> Value {
    json!({
        "nodes": [
            { "id": "input-1", "type": "input", "value": "hello" },
            { "id": "ai-1", "type": "ai", "prompt": "Say $input_1 loudly" },
            { "id": "output-1", "type": "output" }
        ],
        "edges": [
            { "from": "input-1", "to": "ai-1" },
            { "from": "ai-1", "to": "output-1" }
        ]
    })
}

/// POSTs `body` as JSON; returns status and raw response body.
pub async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, String) {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, text) = post(app, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}
