//! unitflow-server binary: serves the editor API.
//!
//! Configure via env (or `.env`): `LISTEN`, `OPENAI_API_KEY`, `OPENAI_API_BASE`,
//! `OPENAI_MODEL`, `DEEPSEEK_API_BASE`, `DEEPSEEK_MODEL`, `UNITFLOW_TEMPERATURE`,
//! `RUST_LOG`, `LOG_FILE`.

use std::sync::Arc;

use tracing::info;
use unitflow_server::{app, init_tracing, load_dotenv, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    load_dotenv();
    init_tracing()?;

    let config = ServerConfig::from_env();
    info!(
        standard = %config.standard.model,
        reasoner = %config.reasoner.model,
        temperature = config.temperature,
        default_key = config.api_key.is_some(),
        "provider config loaded"
    );
    if config.api_key.is_none() {
        info!("OPENAI_API_KEY not set; requests must carry apiKey to use ai units");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("listening on http://{}", config.listen);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
