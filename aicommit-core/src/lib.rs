//! aicommit-core - configuration, providers, and git plumbing for aicommit.
//!
//! # Overview
//!
//! Everything the review TUI treats as an external collaborator lives here:
//! the persisted provider settings, the prompt sent to the model, the
//! [`provider::Generator`] capability with one implementation per wire
//! format, and the git diff source / commit executor.

pub mod config;
pub mod error;
pub mod git;
pub mod prompt;
pub mod provider;

pub use config::Config;
pub use error::{ConfigError, GitError, ProviderError};
pub use prompt::Language;
pub use provider::{Generator, ProviderKind};
