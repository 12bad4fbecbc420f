//! Generation providers.
//!
//! Every provider implements [`Generator`]: one diff in, one commit message
//! out. The concrete type is chosen from [`Config::provider`] by
//! [`from_config`]; callers hold an `Arc<dyn Generator>` and never see the
//! wire format.

pub mod chat;
pub mod messages;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::ProviderError;

pub use chat::ChatCompletionsProvider;
pub use messages::MessagesProvider;

/// Longest error body kept from a non-success response.
const MAX_ERROR_BODY: usize = 500;

/// Capability to turn a diff into a commit message.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a commit message for `diff`.
    ///
    /// `deadline` bounds the whole HTTP exchange. The returned text is
    /// already trimmed and stripped of markdown fences.
    async fn generate(&self, diff: &str, deadline: Duration) -> Result<String, ProviderError>;

    /// Short label shown while a request is in flight.
    fn name(&self) -> &str;
}

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    DeepSeek,
    OpenAi,
    Grok,
    Claude,
    /// Any OpenAI-compatible endpoint (Ollama, vLLM, proxies).
    Custom,
}

/// Request shape spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    ChatCompletions,
    Messages,
}

/// Endpoint defaults for a provider.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub base_url: &'static str,
    pub path: &'static str,
    pub models: &'static [&'static str],
    pub wire: WireFormat,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::DeepSeek,
        ProviderKind::OpenAi,
        ProviderKind::Grok,
        ProviderKind::Claude,
        ProviderKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Grok => "grok",
            ProviderKind::Claude => "claude",
            ProviderKind::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Grok => "Grok",
            ProviderKind::Claude => "Claude",
            ProviderKind::Custom => "Custom",
        }
    }

    pub fn preset(&self) -> Preset {
        match self {
            ProviderKind::DeepSeek => Preset {
                base_url: "https://api.deepseek.com",
                path: "/chat/completions",
                models: &["deepseek-chat", "deepseek-reasoner"],
                wire: WireFormat::ChatCompletions,
            },
            ProviderKind::OpenAi => Preset {
                base_url: "https://api.openai.com",
                path: "/v1/chat/completions",
                models: &["gpt-5-nano", "gpt-5-mini", "gpt-5.1", "gpt-4o"],
                wire: WireFormat::ChatCompletions,
            },
            ProviderKind::Grok => Preset {
                base_url: "https://api.x.ai",
                path: "/v1/chat/completions",
                models: &[
                    "grok-4-1-fast-non-reasoning",
                    "grok-4-1-fast-reasoning",
                    "grok-code-fast-1",
                ],
                wire: WireFormat::ChatCompletions,
            },
            ProviderKind::Claude => Preset {
                base_url: "https://api.anthropic.com",
                path: "/v1/messages",
                models: &["claude-sonnet-4-5", "claude-haiku-4-5", "claude-opus-4-5"],
                wire: WireFormat::Messages,
            },
            ProviderKind::Custom => Preset {
                base_url: "",
                path: "/v1/chat/completions",
                models: &[],
                wire: WireFormat::ChatCompletions,
            },
        }
    }

    /// Hosted providers refuse requests without a key; custom endpoints
    /// are often local and unauthenticated.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Custom)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown provider '{}' (expected one of: deepseek, openai, grok, claude, custom)",
                    s.trim()
                )
            })
    }
}

/// Endpoint, credentials, and prompt settings resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub label: String,
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub prompt: crate::prompt::PromptOptions,
}

impl Endpoint {
    /// Resolve the endpoint for `cfg`, rejecting a missing API key or
    /// base URL up front so the failure is reported before the TUI starts.
    pub fn from_config(cfg: &Config) -> Result<Self, ProviderError> {
        let api_key = cfg.resolve_api_key();
        if api_key.is_empty() && cfg.provider.requires_api_key() {
            return Err(ProviderError::MissingApiKey {
                provider: cfg.provider.display_name().to_string(),
            });
        }
        let base_url = cfg.effective_base_url();
        if base_url.is_empty() {
            return Err(ProviderError::MissingBaseUrl);
        }
        let model = cfg.effective_model();
        Ok(Self {
            label: format!("{} ({})", cfg.provider.display_name(), model),
            url: cfg.endpoint(),
            api_key,
            model,
            prompt: cfg.prompt_options(),
        })
    }
}

/// Build the generator selected by `cfg.provider`.
pub fn from_config(cfg: &Config) -> Result<Arc<dyn Generator>, ProviderError> {
    let endpoint = Endpoint::from_config(cfg)?;
    debug!("Using provider {} at {}", endpoint.label, endpoint.url);
    let generator: Arc<dyn Generator> = match cfg.provider.preset().wire {
        WireFormat::ChatCompletions => Arc::new(ChatCompletionsProvider::new(endpoint)?),
        WireFormat::Messages => Arc::new(MessagesProvider::new(endpoint)?),
    };
    Ok(generator)
}

pub(crate) fn http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .user_agent(concat!("aicommit/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ProviderError::Client)
}

/// Send `request` and return the body of a successful response.
pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await.map_err(ProviderError::Request)?;
    let status = response.status();
    let body = response.text().await.map_err(ProviderError::Request)?;
    if !status.is_success() {
        let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
        return Err(ProviderError::Status { status: status.as_u16(), body });
    }
    Ok(body)
}

/// Trim the model output and strip a surrounding markdown code fence.
pub fn normalize_message(raw: &str) -> Result<String, ProviderError> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence line, including any language tag.
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        text = text.trim_end();
        text = text.strip_suffix("```").unwrap_or(text);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text.to_string())
}
