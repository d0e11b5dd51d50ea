//! Builds the engine for a [`RunConfig`]: completion client, credentials, model and mode.

use std::sync::Arc;

use unitflow::{CompletionClient, Engine};

use crate::config::RunConfig;

#[cfg(feature = "openai")]
fn completion_client(config: &RunConfig) -> Arc<dyn CompletionClient> {
    use unitflow::{ChatCompletion, Endpoint};

    Arc::new(
        ChatCompletion::new()
            .with_standard(Endpoint::new(&config.api_base, &config.model))
            .with_reasoner(Endpoint::new(
                &config.reasoner_api_base,
                &config.reasoner_model,
            ))
            .with_temperature(config.temperature),
    )
}

#[cfg(not(feature = "openai"))]
fn completion_client(_config: &RunConfig) -> Arc<dyn CompletionClient> {
    Arc::new(unitflow::MockCompletion::failing(
        unitflow::RemoteCallError::new("unitflow-cli was built without the openai feature"),
    ))
}

/// Engine configured from `config`. No credentials are attached when no api key is set,
/// so graphs with ai units are refused before any node runs.
pub fn build_engine(config: &RunConfig) -> Engine {
    let engine = Engine::new(completion_client(config))
        .with_mode(config.mode)
        .with_model(config.model_selector());
    match config.credentials() {
        Some(credentials) => engine.with_credentials(credentials),
        None => engine,
    }
}
