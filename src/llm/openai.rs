//! Completion client for the OpenAI chat completions API.
//!
//! Each prompt is sent as one user message after a fixed system message. The first choice's
//! content is the completion text.

use super::{Completion, LlmClient, LlmClientError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// OpenAI chat completions adapter.
///
/// The API key is handed in at construction; a missing key short-circuits every call into a
/// failure without touching the network.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create an adapter for the given base URL, key, and model.
    pub fn new(http: Client, base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmClientError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(LlmClientError::ProviderUnavailable(
                "OpenAI API key not set".into(),
            ));
        };

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": max_tokens,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                LlmClientError::ProviderUnavailable(format!(
                    "failed to reach OpenAI at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(LlmClientError::ProviderUnavailable(
                "OpenAI rejected the API key".into(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            LlmClientError::InvalidResponse(format!("failed to decode OpenAI response: {error}"))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("response has no choices".into()))?;

        let output = content.trim().to_string();
        tracing::debug!(model = %self.model, chars = output.len(), "LLM response received");
        Ok(output)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Completion {
        Completion::from_result(self.generate(prompt, max_tokens).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(base_url: String, api_key: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(
            Client::builder()
                .user_agent("docsift-test")
                .build()
                .expect("client"),
            base_url,
            api_key.map(str::to_string),
            "gpt-4o-mini".into(),
        )
    }

    #[tokio::test]
    async fn returns_trimmed_message_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .json_body_partial(r#"{"model":"gpt-4o-mini","max_tokens":3000}"#);
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "  A short summary.\n" } }
                    ]
                }));
            })
            .await;

        let completion = client(server.base_url(), Some("sk-test"))
            .complete("Summarize this", 3000)
            .await;

        mock.assert_async().await;
        assert_eq!(completion, Completion::Value("A short summary.".into()));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200);
            })
            .await;

        let completion = client(server.base_url(), None).complete("Summarize", 10).await;

        assert_eq!(mock.hits_async().await, 0);
        assert!(completion.is_failed());
        assert_eq!(completion.into_text(), "");
    }

    #[tokio::test]
    async fn error_status_becomes_failed_completion() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500).body("boom");
            })
            .await;

        let completion = client(server.base_url(), Some("sk-test"))
            .complete("Summarize", 10)
            .await;

        let reason = completion.failure().expect("failure reason");
        assert!(reason.contains("500"), "unexpected reason: {reason}");
    }

    #[tokio::test]
    async fn malformed_body_becomes_failed_completion() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let completion = client(server.base_url(), Some("sk-test"))
            .complete("Summarize", 10)
            .await;

        assert!(completion.is_failed());
    }
}
