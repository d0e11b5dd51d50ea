//! Server config from env vars (after `.env` is loaded).

use std::fmt;

use unitflow::Endpoint;

#[derive(Clone)]
pub struct ServerConfig {
    /// `LISTEN`, default `0.0.0.0:3000`.
    pub listen: String,
    /// `OPENAI_API_KEY`; fallback for requests without `apiKey`.
    pub api_key: Option<String>,
    /// `OPENAI_API_BASE` / `OPENAI_MODEL`.
    pub standard: Endpoint,
    /// `DEEPSEEK_API_BASE` / `DEEPSEEK_MODEL`, used when a request sets `useR1`.
    pub reasoner: Endpoint,
    /// `UNITFLOW_TEMPERATURE`, default 0.7.
    pub temperature: f32,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen", &self.listen)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("standard", &self.standard)
            .field("reasoner", &self.reasoner)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            api_key: None,
            standard: Endpoint::openai(),
            reasoner: Endpoint::deepseek(),
            temperature: 0.7,
        }
    }
}

impl ServerConfig {
    /// Reads the env. Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            listen: var("LISTEN").unwrap_or(defaults.listen),
            api_key: var("OPENAI_API_KEY"),
            standard: Endpoint::new(
                var("OPENAI_API_BASE").unwrap_or(defaults.standard.api_base),
                var("OPENAI_MODEL").unwrap_or(defaults.standard.model),
            ),
            reasoner: Endpoint::new(
                var("DEEPSEEK_API_BASE").unwrap_or(defaults.reasoner.api_base),
                var("DEEPSEEK_MODEL").unwrap_or(defaults.reasoner.model),
            ),
            temperature: var("UNITFLOW_TEMPERATURE")
                .and_then(|t| t.trim().parse().ok())
                .unwrap_or(defaults.temperature),
        }
    }
}
