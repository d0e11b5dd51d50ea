//! Run config: credentials, endpoints, model selection, scheduler mode and temperature.
//! Filled from env vars; the entry points in [`run`](crate::run) load `.env` first.

use std::fmt;

use unitflow::{Credentials, ModelSelector, RunMode};

/// Error type used for config loading and CLI runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Everything needed to build an engine for one run.
#[derive(Clone)]
pub struct RunConfig {
    /// Provider api key. Only required when the graph contains ai units.
    pub api_key: Option<String>,
    /// Chat Completions base URL for the standard model, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    /// Standard model name, e.g. `gpt-4o`.
    pub model: String,
    /// Base URL of the reasoning model endpoint.
    pub reasoner_api_base: String,
    /// Reasoning model name, e.g. `deepseek-reasoner`.
    pub reasoner_model: String,
    pub mode: RunMode,
    /// When true, ai units use the reasoning model.
    pub reasoner: bool,
    pub temperature: f32,
    /// When true, print node enter/exit while the graph runs.
    pub verbose: bool,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("reasoner_api_base", &self.reasoner_api_base)
            .field("reasoner_model", &self.reasoner_model)
            .field("mode", &self.mode)
            .field("reasoner", &self.reasoner)
            .field("temperature", &self.temperature)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            reasoner_api_base: "https://api.deepseek.com".to_string(),
            reasoner_model: "deepseek-reasoner".to_string(),
            mode: RunMode::Sequential,
            reasoner: false,
            temperature: 0.7,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Fill config from env vars. Call `dotenv::dotenv().ok()` first to pick up `.env`.
    ///
    /// `OPENAI_API_KEY` is optional here; a graph with ai units is refused at run time
    /// without it. `OPENAI_API_BASE`, `OPENAI_MODEL`, `DEEPSEEK_API_BASE`,
    /// `DEEPSEEK_MODEL`, `UNITFLOW_RUN_MODE` (sequential|parallel) and
    /// `UNITFLOW_TEMPERATURE` have defaults.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let api_base = std::env::var("OPENAI_API_BASE").unwrap_or(defaults.api_base);
        let model = std::env::var("OPENAI_MODEL").unwrap_or(defaults.model);
        let reasoner_api_base =
            std::env::var("DEEPSEEK_API_BASE").unwrap_or(defaults.reasoner_api_base);
        let reasoner_model = std::env::var("DEEPSEEK_MODEL").unwrap_or(defaults.reasoner_model);
        let mode = match std::env::var("UNITFLOW_RUN_MODE") {
            Ok(s) => s.parse::<RunMode>().map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("UNITFLOW_RUN_MODE: {}", e),
                )
            })?,
            Err(_) => defaults.mode,
        };
        let temperature = match std::env::var("UNITFLOW_TEMPERATURE") {
            Ok(s) => s.trim().parse::<f32>().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("UNITFLOW_TEMPERATURE is not a number: {}", s),
                )
            })?,
            Err(_) => defaults.temperature,
        };
        Ok(Self {
            api_key,
            api_base,
            model,
            reasoner_api_base,
            reasoner_model,
            mode,
            reasoner: false,
            temperature,
            verbose: false,
        })
    }

    /// Apply optional overrides from `RunOptions`. Only set fields override.
    pub fn apply_options(&mut self, options: &super::RunOptions) {
        if let Some(mode) = options.mode {
            self.mode = mode;
        }
        if options.reasoner {
            self.reasoner = true;
        }
        if let Some(t) = options.temperature {
            self.temperature = t;
        }
        self.verbose = options.verbose;
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.api_key.as_deref().map(Credentials::new)
    }

    pub fn model_selector(&self) -> ModelSelector {
        if self.reasoner {
            ModelSelector::Reasoner
        } else {
            ModelSelector::Standard
        }
    }

    /// Name of the model ai units will be sent to.
    pub fn active_model(&self) -> &str {
        match self.model_selector() {
            ModelSelector::Standard => &self.model,
            ModelSelector::Reasoner => &self.reasoner_model,
        }
    }
}
