//! Guided setup for `aicommit config` run without a subcommand.
//!
//! Prompts for the provider, a preset model (or a manually entered one), the
//! API key, the message language, the description toggle and the subject
//! separator. The answers are folded into the loaded [`Config`] by
//! [`apply_answers`], which holds all the logic and is tested on its own.

use aicommit_core::{Config, Language, ProviderKind};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};

/// Label of the trailing entry in the model list that asks for a name.
pub const MANUAL_MODEL: &str = "Other model (enter manually)";

/// Which model the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Preset(String),
    /// Free-form name; empty falls back to the provider's first preset.
    Manual(String),
}

/// Everything the wizard asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub provider: ProviderKind,
    pub model: ModelChoice,
    /// Empty keeps the key already on file.
    pub api_key: String,
    pub language: Language,
    pub with_description: bool,
    pub subject_separator: String,
}

/// Entries for the model selector: the provider's presets, then [`MANUAL_MODEL`].
pub fn model_options(kind: ProviderKind) -> Vec<String> {
    kind.preset()
        .models
        .iter()
        .map(|m| m.to_string())
        .chain(std::iter::once(MANUAL_MODEL.to_string()))
        .collect()
}

/// Returns `base` updated with `answers`.
///
/// Switching provider resets the endpoint to the new preset, the same way
/// `config set provider` does. Timeout and theme are left untouched.
pub fn apply_answers(base: &Config, answers: Answers) -> Config {
    let mut config = base.clone();
    config.apply_provider(answers.provider);
    config.model = match answers.model {
        ModelChoice::Preset(name) | ModelChoice::Manual(name) => name.trim().to_string(),
    };
    let key = answers.api_key.trim();
    if !key.is_empty() {
        config.api_key = key.to_string();
    }
    config.language = answers.language;
    config.with_description = answers.with_description;
    config.subject_separate_symbol = answers.subject_separator;
    config
}

/// Runs the prompts. Returns `None` when the user backs out of a selector.
pub fn prompt(current: &Config) -> Result<Option<Answers>> {
    let providers: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.display_name()).collect();
    let provider_default = ProviderKind::ALL
        .iter()
        .position(|k| *k == current.provider)
        .unwrap_or(0);
    let Some(idx) = Select::new()
        .with_prompt("AI provider")
        .items(&providers[..])
        .default(provider_default)
        .interact_opt()
        .context("Failed to read provider")?
    else {
        return Ok(None);
    };
    let provider = ProviderKind::ALL[idx];

    let model = if provider.preset().models.is_empty() {
        ModelChoice::Manual(ask_model_name(current)?)
    } else {
        let options = model_options(provider);
        let model_default = options.iter().position(|m| *m == current.model).unwrap_or(0);
        let Some(idx) = Select::new()
            .with_prompt(format!("{} model", provider.display_name()))
            .items(&options[..])
            .default(model_default)
            .interact_opt()
            .context("Failed to read model")?
        else {
            return Ok(None);
        };
        if options[idx] == MANUAL_MODEL {
            ModelChoice::Manual(ask_model_name(current)?)
        } else {
            ModelChoice::Preset(options[idx].clone())
        }
    };

    let api_key = Password::new()
        .with_prompt(format!("API key [{}]", current.masked_api_key()))
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    let languages = ["Chinese (cn)", "English (en)"];
    let language_default = usize::from(current.language == Language::En);
    let Some(idx) = Select::new()
        .with_prompt("Commit message language")
        .items(&languages[..])
        .default(language_default)
        .interact_opt()
        .context("Failed to read language")?
    else {
        return Ok(None);
    };
    let language = if idx == 0 { Language::Cn } else { Language::En };

    let Some(with_description) = Confirm::new()
        .with_prompt("Generate a detailed description?")
        .default(current.with_description)
        .interact_opt()
        .context("Failed to read description toggle")?
    else {
        return Ok(None);
    };

    let subject_separator: String = Input::new()
        .with_prompt("Subject separator")
        .default(current.subject_separate_symbol.clone())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read subject separator")?;

    Ok(Some(Answers {
        provider,
        model,
        api_key,
        language,
        with_description,
        subject_separator,
    }))
}

fn ask_model_name(current: &Config) -> Result<String> {
    Input::new()
        .with_prompt("Model name (e.g. gpt-4-turbo)")
        .default(current.model.clone())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read model name")
}
