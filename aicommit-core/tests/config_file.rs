//! Integration test for the on-disk configuration round trip.

use aicommit_core::config::Config;
use aicommit_core::{ConfigError, Language, ProviderKind};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.provider, ProviderKind::DeepSeek);
    assert_eq!(cfg.timeout_secs, 30);
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.set("provider", "claude").unwrap();
    cfg.set("api_key", "sk-ant-0123456789").unwrap();
    cfg.set("language", "cn").unwrap();
    cfg.set("with_description", "true").unwrap();
    cfg.set("subject_separate_symbol", " | ").unwrap();
    cfg.set("timeout_secs", "45").unwrap();
    cfg.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.provider, ProviderKind::Claude);
    assert_eq!(loaded.language, Language::Cn);
    assert_eq!(loaded.effective_model(), "claude-sonnet-4-5");
    assert_eq!(loaded.endpoint(), "https://api.anthropic.com/v1/messages");
    assert_eq!(loaded.subject_separate_symbol, " | ");
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "provider = \"openai\"\nmodel = \"gpt-4o\"\n").unwrap();

    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.provider, ProviderKind::OpenAi);
    assert_eq!(cfg.effective_model(), "gpt-4o");
    assert_eq!(cfg.endpoint(), "https://api.openai.com/v1/chat/completions");
    assert_eq!(cfg.timeout_secs, 30);
    assert_eq!(cfg.theme, "dark");
}

#[test]
fn malformed_file_reports_parse_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "provider = [unterminated").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}
