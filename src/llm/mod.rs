//! Text-completion capability consumed by the summarization and tabular stages.
//!
//! Every provider sits behind [`LlmClient`]. Adapters talk HTTP directly with `reqwest` and turn
//! any transport, status, or decoding problem into [`Completion::Failed`]; nothing in this module
//! returns an error to the pipeline. Callers store [`Completion::into_text`], so a failed call
//! shows up downstream as an empty string.

mod ollama;
mod openai;
pub mod prompts;

use crate::config::{Config, LlmProvider};
use crate::outcome::Outcome;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Result of one completion request.
pub type Completion = Outcome<String>;

impl Completion {
    /// Text to store in the result document; empty for both empty and failed completions.
    pub fn into_text(self) -> String {
        self.unwrap_or_default()
    }

    /// Convert an adapter result, logging failures instead of propagating them.
    pub fn from_result(result: Result<String, LlmClientError>) -> Self {
        match result {
            Ok(text) => Completion::from_text(text),
            Err(error) => {
                tracing::error!(error = %error, "LLM call failed");
                Completion::Failed(error.to_string())
            }
        }
    }
}

/// Errors surfaced by completion adapters before they are folded into a [`Completion`].
#[derive(Debug, Error)]
pub enum LlmClientError {
    /// Provider was disabled, misconfigured, or unreachable.
    #[error("LLM provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete `prompt`, asking for at most `max_tokens` tokens.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Completion;
}

/// Client used when completions are switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClient;

#[async_trait]
impl LlmClient for DisabledClient {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Completion {
        Completion::from_result(Err(LlmClientError::ProviderUnavailable(
            "LLM provider disabled".into(),
        )))
    }
}

/// Build the completion client selected by configuration.
pub fn build_llm_client(config: &Config) -> Result<Box<dyn LlmClient>, LlmClientError> {
    match config.llm_provider {
        LlmProvider::None => Ok(Box::new(DisabledClient)),
        LlmProvider::OpenAI => Ok(Box::new(OpenAiClient::new(
            http_client(config)?,
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.llm_model.clone(),
        ))),
        LlmProvider::Ollama => Ok(Box::new(OllamaClient::new(
            http_client(config)?,
            config.ollama_url.clone(),
            config.llm_model.clone(),
        ))),
    }
}

fn http_client(config: &Config) -> Result<Client, LlmClientError> {
    let mut builder = Client::builder().user_agent("docsift/llm");
    if let Some(seconds) = config.llm_timeout_secs {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    Ok(builder.build()?)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Completion, LlmClient};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and records every prompt it receives.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        responses: Mutex<VecDeque<Completion>>,
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl ScriptedClient {
        pub(crate) fn replying<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::with_outcomes(
                responses
                    .into_iter()
                    .map(|text| Completion::from_text(text.into())),
            )
        }

        pub(crate) fn with_outcomes<I>(outcomes: I) -> Self
        where
            I: IntoIterator<Item = Completion>,
        {
            Self {
                responses: Mutex::new(outcomes.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts
                .lock()
                .expect("prompt log")
                .iter()
                .map(|(prompt, _)| prompt.clone())
                .collect()
        }

        pub(crate) fn token_budgets(&self) -> Vec<u32> {
            self.prompts
                .lock()
                .expect("prompt log")
                .iter()
                .map(|(_, max_tokens)| *max_tokens)
                .collect()
        }

        pub(crate) fn call_count(&self) -> usize {
            self.prompts.lock().expect("prompt log").len()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, prompt: &str, max_tokens: u32) -> Completion {
            self.prompts
                .lock()
                .expect("prompt log")
                .push((prompt.to_string(), max_tokens));
            self.responses
                .lock()
                .expect("responses")
                .pop_front()
                .unwrap_or(Completion::Empty)
        }
    }
}
