//! Remote completion client used by ai units.
//!
//! The engine sees a single call, `complete(prompt, credentials, model)`, and treats any
//! failure as the failure of that one unit. This module defines the trait, the
//! credential and model-selector types, a mock for tests, and the OpenAI-compatible
//! [`ChatCompletion`] client (feature `openai`).

mod mock;

#[cfg(feature = "openai")]
mod openai;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mock::MockCompletion;

#[cfg(feature = "openai")]
pub use openai::{ChatCompletion, Endpoint};

/// API key sent with every completion call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// True when the key is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Which provider/model serves the call: a general chat model, or a reasoning model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSelector {
    #[default]
    Standard,
    Reasoner,
}

impl FromStr for ModelSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "default" => Ok(Self::Standard),
            "reasoner" | "r1" => Ok(Self::Reasoner),
            _ => Err(format!("unknown model: {} (use standard or reasoner)", s)),
        }
    }
}

/// Failure of a remote completion call, carrying the provider status when known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote call failed{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
pub struct RemoteCallError {
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Completion client: given prompt text, returns the model's reply text.
///
/// Implementations: [`MockCompletion`] (tests), [`ChatCompletion`] (real API, feature `openai`).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        credentials: &Credentials,
        model: ModelSelector,
    ) -> Result<String, RemoteCallError>;
}
