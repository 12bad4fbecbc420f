//! aicommit: review AI-written commit messages before committing them.
//!
//! Entry point for the `aicommit` binary. Wires together configuration and
//! providers (`aicommit-core`), the terminal lifecycle (`tui`), the unified
//! event bus (`event`), the review controller (`app`), and the event loop.
//!
//! # Startup sequence
//!
//! 1. Parse the CLI and set up file logging (never to the terminal).
//! 2. Load config, apply CLI overrides, open the repository, read the staged
//!    diff. Every failure here is reported before the terminal is touched.
//! 3. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 4. Run the event loop until the controller terminates.
//! 5. `restore_tui()` unconditionally, then commit or report the outcome.

mod app;
mod editor;
mod event;
mod event_loop;
mod task;
mod theme;
mod tui;
mod ui;
mod wizard;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use aicommit_core::config::{config_path, Config};
use aicommit_core::git::{self, MAX_DIFF_CHARS};
use aicommit_core::{provider, GitError, Generator, ProviderKind};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{Outcome, ReviewController, ReviewSettings, SessionOutcome};
use crate::event::EventHandler;
use crate::task::TaskRunner;
use crate::theme::Theme;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "AICOMMIT_LOG";

/// Generate a commit message for the staged changes with an LLM, review it,
/// and commit.
#[derive(Parser, Debug)]
#[command(name = "aicommit")]
#[command(version)]
struct Cli {
    /// Stage all changes (`git add -A`) before generating
    #[arg(short = 'a', long)]
    add: bool,

    /// Provider to use for this run (deepseek, openai, grok, claude, custom)
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Model to use for this run
    #[arg(long)]
    model: Option<String>,

    /// Generation timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configuration (guided setup when no action is given)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Show the current configuration
    List,
    /// Print the configuration file path
    Path,
    /// List preset models for a provider (defaults to the configured one)
    Models { provider: Option<ProviderKind> },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Config { action }) => return config_command(action),
        Some(Commands::Version) => {
            println!("aicommit {}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    let mut config = Config::load()?;
    if let Some(kind) = cli.provider {
        config.apply_provider(kind);
    }
    if let Some(model) = &cli.model {
        config.set("model", model)?;
    }
    if let Some(secs) = cli.timeout {
        config.set("timeout_secs", &secs.to_string())?;
    }

    let repo = git::open_repository(".")?;
    if cli.add {
        git::stage_all(&repo)?;
    }
    let diff = match git::staged_diff(&repo) {
        Ok(diff) => diff,
        Err(GitError::NothingStaged) => {
            eprintln!("{}", GitError::NothingStaged);
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => return Err(e.into()),
    };
    if diff.truncated {
        eprintln!("Note: staged diff truncated to {MAX_DIFF_CHARS} characters");
    }
    info!(
        "Staged {} file(s), +{} -{}",
        diff.files.len(),
        diff.insertions,
        diff.deletions
    );

    let generator = provider::from_config(&config)?;
    let settings = ReviewSettings {
        deadline: config.timeout(),
        provider_label: generator.name().to_string(),
    };
    let theme = Theme::from_name(&config.theme);

    let session = run_review(diff.text, settings, generator, &theme).await?;

    match session.outcome {
        Outcome::Confirmed => {
            let message = session.message.trim();
            if message.is_empty() {
                eprintln!("Aborting commit due to empty commit message.");
                return Ok(ExitCode::FAILURE);
            }
            let summary = git::commit(&repo, message)?;
            println!("[{}] {}", summary.short_id(), summary.subject);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Cancelled | Outcome::Unset => match session.failure {
            Some(reason) => {
                eprintln!("Failed to generate commit message: {reason}");
                Ok(ExitCode::FAILURE)
            }
            None => {
                eprintln!("Commit cancelled.");
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

/// Runs the interactive review and restores the terminal on every path.
async fn run_review(
    diff: String,
    settings: ReviewSettings,
    generator: Arc<dyn Generator>,
    theme: &Theme,
) -> Result<SessionOutcome> {
    // Panic hook first so it is the innermost hook.
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("Failed to register SIGTERM handler")?;
    let mut terminal = tui::init_tui().context("Failed to initialise terminal")?;

    let EventHandler { tx, mut rx } = EventHandler::new();
    let input = event::spawn_event_task(tx.clone());
    let mut runner = TaskRunner::new(generator, tx);
    info!("Starting review with {}", runner.name());

    let (controller, initial) = ReviewController::start(diff, settings);
    let result = event_loop::run(controller, initial, &mut rx, &mut runner, &term_flag, |view| {
        terminal.draw(|frame| ui::render(frame, view, theme)).map(|_| ())
    })
    .await;

    input.abort();
    let cleared = terminal.clear();
    tui::restore_tui().context("Failed to restore terminal")?;
    cleared.context("Failed to clear review area")?;
    Ok(result?)
}

fn config_command(action: Option<ConfigAction>) -> Result<ExitCode> {
    let Some(action) = action else {
        return guided_config();
    };
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Set {key}.");
            if key.trim().eq_ignore_ascii_case("provider") {
                println!("  Model:    {}", config.effective_model());
                println!("  Endpoint: {}", config.endpoint());
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", config.printable());
        }
        ConfigAction::Path => println!("{}", config_path().display()),
        ConfigAction::Models { provider } => {
            let config = Config::load()?;
            let kind = provider.unwrap_or(config.provider);
            let models = kind.preset().models;
            if models.is_empty() {
                println!(
                    "No preset models for {}. Set one with: aicommit config set model <name>",
                    kind.display_name()
                );
            } else {
                let current = config.effective_model();
                println!("{} models:", kind.display_name());
                for model in models {
                    let marker = if kind == config.provider && *model == current { "*" } else { " " };
                    println!(" {marker} {model}");
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Walks through provider, model, key, and prompt settings, then saves.
fn guided_config() -> Result<ExitCode> {
    let current = Config::load()?;
    let Some(answers) = wizard::prompt(&current)? else {
        println!("Configuration cancelled.");
        return Ok(ExitCode::SUCCESS);
    };
    let config = wizard::apply_answers(&current, answers);
    config.save()?;
    println!("Configuration saved to {}", config_path().display());
    println!("{}", config.printable());
    Ok(ExitCode::SUCCESS)
}

/// `$XDG_STATE_HOME/aicommit/aicommit.log`, falling back to
/// `~/.local/state/aicommit/aicommit.log`.
fn log_path() -> PathBuf {
    let base = std::env::var("XDG_STATE_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local").join("state"))
        })
        .unwrap_or_else(|| PathBuf::from(".local/state"));
    base.join("aicommit").join("aicommit.log")
}

/// Installs a file-backed subscriber. Logging must never write to the
/// terminal while the TUI is up, so any setup failure just leaves logging off.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let path = log_path();
    if let Some(dir) = path.parent() {
        if std::fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
