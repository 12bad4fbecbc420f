//! Persisted user configuration.
//!
//! Settings live in a TOML file under the XDG config directory. A missing
//! file is not an error: defaults for the DeepSeek provider are returned so
//! `aicommit config set` can create the file on first use. Empty endpoint
//! fields fall back to the selected provider's preset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::prompt::{Language, PromptOptions};
use crate::provider::ProviderKind;

/// Environment variable that overrides `api_key` from the file.
pub const API_KEY_ENV: &str = "AICOMMIT_API_KEY";

/// Default deadline for one generation attempt.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Keys accepted by [`Config::set`].
pub const SUPPORTED_KEYS: &[&str] = &[
    "provider",
    "api_key",
    "model",
    "base_url",
    "path",
    "language",
    "with_description",
    "subject_separate_symbol",
    "timeout_secs",
    "theme",
];

/// Returns the path to the aicommit config file.
///
/// Prefers `$XDG_CONFIG_HOME/aicommit/config.toml`; falls back to
/// `~/.config/aicommit/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("aicommit").join("config.toml")
}

/// Provider, prompt, and UI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub path: String,
    pub language: Language,
    pub with_description: bool,
    pub subject_separate_symbol: String,
    pub timeout_secs: u64,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: String::new(),
            model: String::new(),
            base_url: String::new(),
            path: String::new(),
            language: Language::default(),
            with_description: false,
            subject_separate_symbol: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            theme: "dark".to_string(),
        }
    }
}

impl Config {
    /// Load from the default [`config_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path. A missing file yields [`Config::default`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read { path: path.to_path_buf(), source });
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default [`config_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path())
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let body = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, body).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Update one key from its string form.
    ///
    /// Setting `provider` also switches `base_url`, `path`, and (when the
    /// current model belongs to another provider) `model` to the preset.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key.trim().to_ascii_lowercase().as_str() {
            "provider" => {
                let kind: ProviderKind = value.parse().map_err(invalid)?;
                self.apply_provider(kind);
            }
            "api_key" => self.api_key = value.trim().to_string(),
            "model" => self.model = value.trim().to_string(),
            "base_url" => self.base_url = value.trim().trim_end_matches('/').to_string(),
            "path" => {
                let path = value.trim();
                self.path = if path.starts_with('/') || path.is_empty() {
                    path.to_string()
                } else {
                    format!("/{path}")
                };
            }
            "language" => self.language = value.parse().map_err(invalid)?,
            "with_description" => {
                self.with_description = parse_bool(value).ok_or_else(|| {
                    invalid("expected true/false".to_string())
                })?;
            }
            "subject_separate_symbol" => self.subject_separate_symbol = value.to_string(),
            "timeout_secs" => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
                if secs == 0 {
                    return Err(invalid("must be greater than zero".to_string()));
                }
                self.timeout_secs = secs;
            }
            "theme" => self.theme = value.trim().to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Switch provider. Endpoint fields are cleared so the new preset
    /// applies; a custom provider keeps the user's `base_url`.
    pub fn apply_provider(&mut self, kind: ProviderKind) {
        let preset = kind.preset();
        let keep_model = preset.models.is_empty() || preset.models.contains(&self.model.as_str());
        self.provider = kind;
        if !preset.base_url.is_empty() {
            self.base_url.clear();
        }
        self.path.clear();
        if !keep_model {
            self.model.clear();
        }
    }

    /// `model`, or the provider's first preset model when unset.
    pub fn effective_model(&self) -> String {
        if self.model.is_empty() {
            self.provider.preset().models.first().map(|m| m.to_string()).unwrap_or_default()
        } else {
            self.model.clone()
        }
    }

    /// `base_url`, or the provider preset when unset.
    pub fn effective_base_url(&self) -> String {
        let base = if self.base_url.is_empty() {
            self.provider.preset().base_url
        } else {
            self.base_url.as_str()
        };
        base.trim_end_matches('/').to_string()
    }

    /// `path`, or the provider preset when unset.
    pub fn effective_path(&self) -> String {
        if self.path.is_empty() {
            self.provider.preset().path.to_string()
        } else {
            self.path.clone()
        }
    }

    /// API key from [`API_KEY_ENV`] when set, otherwise from the file.
    pub fn resolve_api_key(&self) -> String {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => self.api_key.clone(),
        }
    }

    /// Full request URL: `base_url` + `path`.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.effective_base_url(), self.effective_path())
    }

    /// Deadline for one generation attempt.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn prompt_options(&self) -> PromptOptions {
        PromptOptions {
            language: self.language,
            with_description: self.with_description,
            subject_separator: self.subject_separate_symbol.clone(),
        }
    }

    /// API key with everything but the first and last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else if !chars.is_empty() {
            "***".to_string()
        } else {
            "(not set)".to_string()
        }
    }

    /// Human-readable summary for `aicommit config list`.
    pub fn printable(&self) -> String {
        let separator = if self.subject_separate_symbol.is_empty() {
            "(none)"
        } else {
            self.subject_separate_symbol.as_str()
        };
        format!(
            "Current Configuration:\n  \
             Provider:         {}\n  \
             Model:            {}\n  \
             Endpoint:         {}\n  \
             API Key:          {}\n  \
             Language:         {}\n  \
             With Description: {}\n  \
             Subject Separator: {}\n  \
             Timeout:          {}s\n  \
             Theme:            {}",
            self.provider,
            self.effective_model(),
            self.endpoint(),
            self.masked_api_key(),
            self.language,
            self.with_description,
            separator,
            self.timeout_secs,
            self.theme,
        )
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}
