//! Mock completion client for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionClient, Credentials, ModelSelector, RemoteCallError};

enum Behavior {
    Uppercase,
    Echo,
    Fixed(String),
    Fail(RemoteCallError),
}

/// Mock client with a fixed behavior; records every prompt it receives.
///
/// `uppercase()` upper-cases the prompt, `echo()` returns it as is, `fixed(text)` always
/// returns `text`, `failing(err)` always fails. A prompt containing `fail_on` fails even
/// for the non-failing behaviors.
pub struct MockCompletion {
    behavior: Behavior,
    fail_on: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            fail_on: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn uppercase() -> Self {
        Self::with_behavior(Behavior::Uppercase)
    }

    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fixed(text.into()))
    }

    pub fn failing(error: RemoteCallError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    /// Fail any prompt containing `needle` (builder style).
    pub fn with_fail_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::uppercase()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(
        &self,
        prompt: &str,
        _credentials: &Credentials,
        _model: ModelSelector,
    ) -> Result<String, RemoteCallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Some(needle) = &self.fail_on {
            if prompt.contains(needle.as_str()) {
                return Err(RemoteCallError::with_status(500, format!("mock failure on {}", needle)));
            }
        }
        match &self.behavior {
            Behavior::Uppercase => Ok(prompt.to_uppercase()),
            Behavior::Echo => Ok(prompt.to_string()),
            Behavior::Fixed(text) => Ok(text.clone()),
            Behavior::Fail(err) => Err(err.clone()),
        }
    }
}
