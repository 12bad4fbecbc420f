//! Error types for aicommit-core using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, editing, or saving the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unknown config key '{0}'. Supported: {keys}",
        keys = crate::config::SUPPORTED_KEYS.join(", ")
    )]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors from a generation provider.
///
/// The review controller never inspects the variant; it only renders the
/// `Display` text, so every message must stand on its own.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No API key configured for {provider}. Run: aicommit config set api_key <your_key>")]
    MissingApiKey { provider: String },

    #[error("No base_url configured for the custom provider. Run: aicommit config set base_url <url>")]
    MissingBaseUrl,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("API request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from model: {0}")]
    Malformed(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Errors from reading the staged diff or creating the commit.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository (or any parent directory): {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("No staged changes. Stage files with `git add` or pass --add")]
    NothingStaged,

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    Signature(#[source] git2::Error),
}
