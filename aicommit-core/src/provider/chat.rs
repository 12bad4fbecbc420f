//! OpenAI-compatible chat completions (`/chat/completions`).
//!
//! Spoken by DeepSeek, OpenAI, Grok, and most self-hosted gateways.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::prompt::{build_messages, Message};
use crate::provider::{http_client, normalize_message, send, Endpoint, Generator};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Provider for any endpoint that accepts a chat completions request.
pub struct ChatCompletionsProvider {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl ChatCompletionsProvider {
    pub fn new(endpoint: Endpoint) -> Result<Self, ProviderError> {
        Ok(Self { endpoint, client: http_client()? })
    }
}

/// Extract the first choice's content from a chat completions body.
pub(crate) fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("unmarshal response failed: {e}")))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::EmptyResponse)?;
    normalize_message(&content)
}

#[async_trait]
impl Generator for ChatCompletionsProvider {
    async fn generate(&self, diff: &str, deadline: Duration) -> Result<String, ProviderError> {
        let messages = build_messages(&self.endpoint.prompt, diff);
        let body = ChatRequest { model: &self.endpoint.model, messages: &messages };

        let mut request = self
            .client
            .post(&self.endpoint.url)
            .timeout(deadline)
            .json(&body);
        if !self.endpoint.api_key.is_empty() {
            request = request.bearer_auth(&self.endpoint.api_key);
        }

        debug!("POST {} (diff {} chars)", self.endpoint.url, diff.len());
        let body = send(request).await?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        &self.endpoint.label
    }
}
