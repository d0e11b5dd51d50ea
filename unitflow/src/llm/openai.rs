//! OpenAI-compatible chat completions client implementing `CompletionClient`.
//!
//! One user message per call, temperature 0.7 unless overridden. `ModelSelector::Standard`
//! goes to the OpenAI endpoint, `ModelSelector::Reasoner` to the DeepSeek endpoint;
//! both speak the same Chat Completions protocol. Depends on `async_openai`
//! (feature `openai`).

use async_trait::async_trait;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

use super::{CompletionClient, Credentials, ModelSelector, RemoteCallError};

/// Base URL and model name served for one [`ModelSelector`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub api_base: String,
    pub model: String,
}

impl Endpoint {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
        }
    }

    pub fn openai() -> Self {
        Self::new("https://api.openai.com/v1", "gpt-4o")
    }

    pub fn deepseek() -> Self {
        Self::new("https://api.deepseek.com", "deepseek-reasoner")
    }
}

/// Chat Completions client; the api key comes with each call.
///
/// **Interaction**: Implements `CompletionClient`; used by the node processor for ai units.
#[derive(Clone, Debug)]
pub struct ChatCompletion {
    standard: Endpoint,
    reasoner: Endpoint,
    temperature: f32,
}

impl Default for ChatCompletion {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatCompletion {
    /// OpenAI `gpt-4o` for standard calls, DeepSeek `deepseek-reasoner` for reasoner calls.
    pub fn new() -> Self {
        Self {
            standard: Endpoint::openai(),
            reasoner: Endpoint::deepseek(),
            temperature: 0.7,
        }
    }

    pub fn with_standard(mut self, endpoint: Endpoint) -> Self {
        self.standard = endpoint;
        self
    }

    pub fn with_reasoner(mut self, endpoint: Endpoint) -> Self {
        self.reasoner = endpoint;
        self
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self, model: ModelSelector) -> &Endpoint {
        match model {
            ModelSelector::Standard => &self.standard,
            ModelSelector::Reasoner => &self.reasoner,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletion {
    async fn complete(
        &self,
        prompt: &str,
        credentials: &Credentials,
        model: ModelSelector,
    ) -> Result<String, RemoteCallError> {
        let endpoint = self.endpoint(model);
        // async_openai appends "/chat/completions"; a trailing slash would double it.
        let config = OpenAIConfig::new()
            .with_api_key(credentials.api_key())
            .with_api_base(endpoint.api_base.trim_end_matches('/'));
        let client = Client::with_config(config);

        let request = CreateChatCompletionRequestArgs::default()
            .model(endpoint.model.clone())
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(prompt),
            )])
            .temperature(self.temperature)
            .build()
            .map_err(|e| RemoteCallError::new(format!("request build failed: {}", e)))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| remote_error(&endpoint.model, e))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RemoteCallError::new("provider returned no choices"))?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

/// Keeps the HTTP status when the transport error carries one.
fn remote_error(model: &str, error: OpenAIError) -> RemoteCallError {
    let message = format!("{} API error: {}", model, error);
    let status = match &error {
        OpenAIError::Reqwest(e) => e.status().map(|s| s.as_u16()),
        _ => None,
    };
    match status {
        Some(status) => RemoteCallError::with_status(status, message),
        None => RemoteCallError::new(message),
    }
}
