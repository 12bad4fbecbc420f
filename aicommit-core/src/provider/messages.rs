//! Anthropic Messages API (`/v1/messages`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::prompt::{system_prompt, user_prompt, Message};
use crate::provider::{http_client, normalize_message, send, Endpoint, Generator};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Provider for the Claude models.
pub struct MessagesProvider {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl MessagesProvider {
    pub fn new(endpoint: Endpoint) -> Result<Self, ProviderError> {
        Ok(Self { endpoint, client: http_client()? })
    }

    fn request_body(&self, diff: &str) -> MessagesRequest<'_> {
        MessagesRequest {
            model: &self.endpoint.model,
            max_tokens: MAX_TOKENS,
            system: system_prompt(&self.endpoint.prompt),
            messages: vec![Message::user(user_prompt(diff))],
        }
    }
}

/// Extract the first text block from a Messages API body.
pub(crate) fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("unmarshal response failed: {e}")))?;
    let text = parsed
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or(ProviderError::EmptyResponse)?;
    normalize_message(&text)
}

#[async_trait]
impl Generator for MessagesProvider {
    async fn generate(&self, diff: &str, deadline: Duration) -> Result<String, ProviderError> {
        let request = self
            .client
            .post(&self.endpoint.url)
            .timeout(deadline)
            .header("x-api-key", &self.endpoint.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(diff));

        debug!("POST {} (diff {} chars)", self.endpoint.url, diff.len());
        let body = send(request).await?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        &self.endpoint.label
    }
}
