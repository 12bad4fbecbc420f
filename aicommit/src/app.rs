//! Review controller for aicommit.
//!
//! [`ReviewController`] is the state machine behind the review screen. It owns
//! the [`Session`] and the editor buffer, reacts to one [`ControllerEvent`] at a
//! time, and answers with a list of [`Command`]s for the event loop to execute.
//! Nothing in here touches the terminal or spawns tasks, so every transition is
//! testable with plain values.
//!
//! # Generation epochs
//!
//! Each generation attempt carries the `generation_epoch` it was launched at.
//! A completion is applied only while the phase is `Loading` and its epoch
//! equals the current one; anything else is a stale result from a superseded
//! attempt and is discarded.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::editor::TextEditor;

/// Number of frames in the loading spinner.
pub const SPINNER_FRAMES: usize = 8;

/// Top-level phase of the review session.
///
/// The initial phase is `Loading`. `Terminated` is absorbing: once reached,
/// every further event is ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A generation attempt is in flight.
    #[default]
    Loading,
    /// A draft message is shown and awaits a decision.
    Review,
    /// The draft is being edited in the [`TextEditor`].
    Editing,
    /// The last attempt failed; the session ends on the next dismiss.
    Error,
    /// The session is over and `outcome` is set.
    Terminated,
}

/// How the session ended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Unset,
    Confirmed,
    Cancelled,
}

/// Full controller state for one invocation.
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: Phase,
    /// Latest generated or edited message. Untouched while `Editing`.
    pub draft_message: String,
    /// Failure text recorded on entering `Error`.
    pub last_error: Option<String>,
    /// Set exactly once, on the transition into `Terminated`.
    pub outcome: Outcome,
    /// Epoch of the most recently launched generation attempt.
    pub generation_epoch: u64,
    /// The staged diff, shared with every generation attempt.
    pub input_text: Arc<str>,
}

/// Key input after translation from terminal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Esc,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Char(char),
    /// Ctrl+C.
    Interrupt,
}

/// Terminal result of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub epoch: u64,
    pub result: Result<String, String>,
}

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Key(Key),
    /// Timer tick; only advances the spinner.
    Tick,
    Completed(Completion),
    /// Issued by the loop after the error view has been shown.
    Dismiss,
    /// SIGTERM or closed input.
    Interrupt,
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch a generation attempt for `diff` tagged with `epoch`.
    Generate {
        epoch: u64,
        diff: Arc<str>,
        deadline: Duration,
    },
    /// Cancel the attempt tagged with `epoch`.
    Cancel { epoch: u64 },
    /// Feed a [`ControllerEvent::Dismiss`] back once the current view is drawn.
    Dismiss,
}

/// Explicit settings passed in from the CLI.
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    /// Wall-clock bound for each generation attempt.
    pub deadline: Duration,
    /// Shown in the loading view, e.g. `"DeepSeek (deepseek-chat)"`.
    pub provider_label: String,
}

/// What the caller reads once the session is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub outcome: Outcome,
    pub message: String,
    /// Failure text when the session ended through `Error`.
    pub failure: Option<String>,
}

/// Render model produced by [`ReviewController::view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading {
        spinner: usize,
        attempt: u64,
        provider: String,
    },
    Review {
        message: String,
    },
    Editing {
        text: String,
        /// Cursor as (row, column) in chars, counted across embedded newlines.
        cursor: (usize, usize),
    },
    Error {
        reason: String,
    },
    Done,
}

impl View {
    /// Key hints shown under the current view as `(action, keys)` pairs.
    pub fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            View::Loading { .. } => &[("Cancel", "q/Esc")],
            View::Review { .. } => &[
                ("Confirm", "Enter"),
                ("Edit", "e"),
                ("Retry", "r"),
                ("Cancel", "q/Esc"),
            ],
            View::Editing { .. } => &[("Save", "Enter/Esc")],
            View::Error { .. } | View::Done => &[],
        }
    }
}

/// The review state machine.
#[derive(Debug)]
pub struct ReviewController {
    session: Session,
    editor: Option<TextEditor>,
    spinner: usize,
    /// Epoch of the attempt this controller considers active.
    in_flight: Option<u64>,
    settings: ReviewSettings,
}

impl ReviewController {
    /// Creates a controller in `Loading` and returns the command that
    /// launches the epoch-0 attempt.
    pub fn start(diff: impl Into<Arc<str>>, settings: ReviewSettings) -> (Self, Vec<Command>) {
        let mut controller = Self {
            session: Session {
                phase: Phase::Loading,
                draft_message: String::new(),
                last_error: None,
                outcome: Outcome::Unset,
                generation_epoch: 0,
                input_text: diff.into(),
            },
            editor: None,
            spinner: 0,
            in_flight: None,
            settings,
        };
        let first = controller.launch(0);
        (controller, vec![first])
    }

    /// Applies one event and returns the commands it requires.
    pub fn handle(&mut self, event: ControllerEvent) -> Vec<Command> {
        if self.is_terminated() {
            debug!("Ignoring {:?} after termination", event);
            return Vec::new();
        }
        match event {
            ControllerEvent::Tick => {
                if self.session.phase == Phase::Loading {
                    self.spinner = (self.spinner + 1) % SPINNER_FRAMES;
                }
                Vec::new()
            }
            ControllerEvent::Completed(completion) => self.on_completion(completion),
            ControllerEvent::Key(key) => self.on_key(key),
            ControllerEvent::Dismiss => {
                if self.session.phase == Phase::Error {
                    self.terminate(Outcome::Cancelled);
                }
                Vec::new()
            }
            ControllerEvent::Interrupt => self.cancel_session(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_terminated(&self) -> bool {
        self.session.phase == Phase::Terminated
    }

    /// Builds the render model for the current phase.
    pub fn view(&self) -> View {
        match self.session.phase {
            Phase::Loading => View::Loading {
                spinner: self.spinner,
                attempt: self.session.generation_epoch + 1,
                provider: self.settings.provider_label.clone(),
            },
            Phase::Review => View::Review {
                message: self.session.draft_message.clone(),
            },
            Phase::Editing => {
                let (text, cursor) = self
                    .editor
                    .as_ref()
                    .map(|e| (e.value().to_owned(), e.cursor()))
                    .unwrap_or_default();
                let before: String = text.chars().take(cursor).collect();
                let row = before.matches('\n').count();
                let col = before.rsplit('\n').next().unwrap_or_default().chars().count();
                View::Editing { text, cursor: (row, col) }
            }
            Phase::Error => View::Error {
                reason: self.session.last_error.clone().unwrap_or_default(),
            },
            Phase::Terminated => View::Done,
        }
    }

    /// Consumes the controller and returns the final message and outcome.
    pub fn finish(self) -> SessionOutcome {
        SessionOutcome {
            outcome: self.session.outcome,
            message: self.session.draft_message,
            failure: self.session.last_error,
        }
    }

    fn on_completion(&mut self, completion: Completion) -> Vec<Command> {
        let current = self.session.generation_epoch;
        if self.session.phase != Phase::Loading
            || completion.epoch != current
            || self.in_flight != Some(completion.epoch)
        {
            debug!(
                "Discarding stale completion (epoch {}, current {}, phase {:?})",
                completion.epoch, current, self.session.phase
            );
            return Vec::new();
        }

        self.in_flight = None;
        match completion.result {
            Ok(message) => {
                debug!("Generation {} succeeded ({} chars)", current, message.len());
                self.session.draft_message = message;
                self.session.phase = Phase::Review;
                Vec::new()
            }
            Err(reason) => {
                info!("Generation {} failed: {}", current, reason);
                self.session.last_error = Some(reason);
                self.session.phase = Phase::Error;
                vec![Command::Dismiss]
            }
        }
    }

    fn on_key(&mut self, key: Key) -> Vec<Command> {
        match self.session.phase {
            Phase::Loading => match key {
                Key::Char('q') | Key::Esc | Key::Interrupt => self.cancel_session(),
                _ => Vec::new(),
            },
            Phase::Review => match key {
                Key::Enter => {
                    self.terminate(Outcome::Confirmed);
                    Vec::new()
                }
                Key::Char('q') | Key::Esc | Key::Interrupt => self.cancel_session(),
                Key::Char('r') => {
                    let epoch = self.session.generation_epoch + 1;
                    vec![self.launch(epoch)]
                }
                Key::Char('e') => {
                    self.editor = Some(TextEditor::from_text(&self.session.draft_message));
                    self.session.phase = Phase::Editing;
                    Vec::new()
                }
                _ => Vec::new(),
            },
            Phase::Editing => {
                match key {
                    Key::Enter | Key::Esc => {
                        if let Some(editor) = self.editor.take() {
                            self.session.draft_message = editor.into_value();
                        }
                        self.session.phase = Phase::Review;
                    }
                    // Unsaved edits are dropped.
                    Key::Interrupt => return self.cancel_session(),
                    other => {
                        if let Some(editor) = self.editor.as_mut() {
                            apply_edit(editor, other);
                        }
                    }
                }
                Vec::new()
            }
            Phase::Error => {
                self.terminate(Outcome::Cancelled);
                Vec::new()
            }
            Phase::Terminated => Vec::new(),
        }
    }

    /// Enters `Loading` at `epoch` and builds the matching `Generate` command.
    fn launch(&mut self, epoch: u64) -> Command {
        self.session.generation_epoch = epoch;
        self.session.phase = Phase::Loading;
        self.in_flight = Some(epoch);
        self.spinner = 0;
        info!("Launching generation attempt {}", epoch);
        Command::Generate {
            epoch,
            diff: Arc::clone(&self.session.input_text),
            deadline: self.settings.deadline,
        }
    }

    /// Ends the session as cancelled, cancelling any attempt in flight.
    fn cancel_session(&mut self) -> Vec<Command> {
        let commands = match self.in_flight.take() {
            Some(epoch) => vec![Command::Cancel { epoch }],
            None => Vec::new(),
        };
        self.editor = None;
        self.terminate(Outcome::Cancelled);
        commands
    }

    fn terminate(&mut self, outcome: Outcome) {
        debug_assert_eq!(self.session.outcome, Outcome::Unset);
        debug!("Session terminated: {:?}", outcome);
        self.session.outcome = outcome;
        self.session.phase = Phase::Terminated;
    }
}

fn apply_edit(editor: &mut TextEditor, key: Key) {
    match key {
        Key::Char(c) => editor.insert_char(c),
        Key::Backspace => editor.backspace(),
        Key::Delete => editor.delete(),
        Key::Left => editor.move_cursor_left(),
        Key::Right => editor.move_cursor_right(),
        Key::Home => editor.move_cursor_home(),
        Key::End => editor.move_cursor_end(),
        Key::Enter | Key::Esc | Key::Interrupt => {}
    }
}
