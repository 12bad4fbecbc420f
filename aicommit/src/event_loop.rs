//! The review event loop.
//!
//! Single-threaded cooperative scheduler: every controller mutation happens
//! here, one event at a time, in arrival order. Events come from a local
//! queue of controller-issued follow-ups first, then from the unified
//! `AppEvent` channel. After each handled event the loop executes the
//! returned commands and renders `controller.view()` through `draw`.
//!
//! A failed attempt stays on screen for [`ERROR_HOLD`] before the session is
//! dismissed; any key dismisses it sooner. The reason is also printed to
//! stderr once the terminal is restored.
//!
//! `draw` is a plain callback so the loop runs headless in tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use crate::app::{Command, ControllerEvent, ReviewController, SessionOutcome, View};
use crate::event::AppEvent;
use crate::task::TaskRunner;
use crate::ui::keybindings;

/// SIGTERM is polled at least this often, even when no events arrive.
const HEARTBEAT: Duration = Duration::from_millis(50);

/// How long the error view is shown before it is dismissed.
pub const ERROR_HOLD: Duration = Duration::from_millis(1500);

/// Runs `controller` until it terminates and returns its outcome.
///
/// `initial` holds the commands returned by [`ReviewController::start`].
/// Any active generation task is cancelled before returning, including when
/// `draw` fails.
///
/// # Errors
///
/// Returns the first error produced by `draw`.
pub async fn run<F>(
    mut controller: ReviewController,
    initial: Vec<Command>,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    runner: &mut TaskRunner,
    term_flag: &AtomicBool,
    mut draw: F,
) -> io::Result<SessionOutcome>
where
    F: FnMut(&View) -> io::Result<()>,
{
    let result = drive(&mut controller, initial, rx, runner, term_flag, &mut draw).await;
    runner.shutdown();
    result.map(|()| controller.finish())
}

async fn drive<F>(
    controller: &mut ReviewController,
    initial: Vec<Command>,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    runner: &mut TaskRunner,
    term_flag: &AtomicBool,
    draw: &mut F,
) -> io::Result<()>
where
    F: FnMut(&View) -> io::Result<()>,
{
    let mut pending: VecDeque<ControllerEvent> = VecDeque::new();
    let mut dismiss_at: Option<Instant> = None;
    execute(initial, runner, &mut dismiss_at);
    draw(&controller.view())?;

    while !controller.is_terminated() {
        let event = match pending.pop_front() {
            Some(event) => event,
            None => {
                let dismiss_deadline = dismiss_at.unwrap_or_else(Instant::now);
                tokio::select! {
                    _ = tokio::time::sleep_until(dismiss_deadline), if dismiss_at.is_some() => {
                        dismiss_at = None;
                        ControllerEvent::Dismiss
                    }
                    _ = tokio::time::sleep(HEARTBEAT) => {
                        if !term_flag.load(Ordering::Relaxed) {
                            continue;
                        }
                        ControllerEvent::Interrupt
                    }
                    maybe_event = rx.recv() => match maybe_event {
                        Some(AppEvent::Key(key)) => match keybindings::translate(key) {
                            Some(key) => ControllerEvent::Key(key),
                            None => continue,
                        },
                        Some(AppEvent::Tick) => ControllerEvent::Tick,
                        Some(AppEvent::Resize(_, _)) => {
                            // ratatui picks up the new size on the next draw.
                            draw(&controller.view())?;
                            continue;
                        }
                        Some(AppEvent::Generation(completion)) => {
                            runner.finished(completion.epoch);
                            ControllerEvent::Completed(completion)
                        }
                        Some(AppEvent::Quit) | None => ControllerEvent::Interrupt,
                    },
                }
            }
        };

        let is_tick = event == ControllerEvent::Tick;
        let commands = controller.handle(event);
        if !is_tick {
            debug!("Phase {:?}, {} command(s)", controller.phase(), commands.len());
        }
        execute(commands, runner, &mut dismiss_at);
        draw(&controller.view())?;

        // Check SIGTERM after every event too, not just on the heartbeat.
        if term_flag.load(Ordering::Relaxed) && !controller.is_terminated() {
            pending.push_back(ControllerEvent::Interrupt);
        }
    }
    Ok(())
}

fn execute(commands: Vec<Command>, runner: &mut TaskRunner, dismiss_at: &mut Option<Instant>) {
    for command in commands {
        match command {
            Command::Generate { epoch, diff, deadline } => runner.launch(epoch, diff, deadline),
            Command::Cancel { epoch } => runner.cancel(epoch),
            Command::Dismiss => {
                debug!("Dismissing error view in {:?}", ERROR_HOLD);
                *dismiss_at = Some(Instant::now() + ERROR_HOLD);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Outcome, ReviewSettings};
    use crate::task::tests::FakeGenerator;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Arc;

    fn settings() -> ReviewSettings {
        ReviewSettings {
            deadline: Duration::from_secs(30),
            provider_label: "Fake (model)".to_string(),
        }
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Runs a session against `fake`, letting `script` react to each
    /// rendered view by sending events on the channel.
    async fn run_session(
        fake: Arc<FakeGenerator>,
        term_flag: &AtomicBool,
        mut script: impl FnMut(&View, &mpsc::UnboundedSender<AppEvent>),
    ) -> (SessionOutcome, Vec<View>, TaskRunner) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runner = TaskRunner::new(fake, tx.clone());
        let (controller, initial) = ReviewController::start("add feature X", settings());
        let mut views = Vec::new();
        let outcome = run(controller, initial, &mut rx, &mut runner, term_flag, |view| {
            views.push(view.clone());
            script(view, &tx);
            Ok(())
        })
        .await
        .unwrap();
        (outcome, views, runner)
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_generated_message() {
        let fake = FakeGenerator::new(vec![(Duration::from_millis(200), Ok("feat: add feature X"))]);
        let flag = AtomicBool::new(false);
        let (out, views, runner) = run_session(fake, &flag, |view, tx| {
            if matches!(view, View::Review { .. }) {
                let _ = tx.send(key(KeyCode::Enter));
            }
        })
        .await;
        assert_eq!(out.outcome, Outcome::Confirmed);
        assert_eq!(out.message, "feat: add feature X");
        assert!(matches!(views.first(), Some(View::Loading { .. })));
        assert_eq!(views.last(), Some(&View::Done));
        assert_eq!(runner.active_epoch(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_then_confirm() {
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Ok("feat: add feature X"))]);
        let flag = AtomicBool::new(false);
        let mut edited = false;
        let (out, _, _) = run_session(fake, &flag, |view, tx| match view {
            View::Review { .. } if !edited => {
                edited = true;
                let _ = tx.send(key(KeyCode::Char('e')));
                for c in " (WIP)".chars() {
                    let _ = tx.send(key(KeyCode::Char(c)));
                }
                let _ = tx.send(key(KeyCode::Enter));
            }
            View::Review { .. } => {
                let _ = tx.send(key(KeyCode::Enter));
            }
            _ => {}
        })
        .await;
        assert_eq!(out.outcome, Outcome::Confirmed);
        assert_eq!(out.message, "feat: add feature X (WIP)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_shows_error_then_ends() {
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Err("boom"))]);
        let flag = AtomicBool::new(false);
        let (out, views, _) = run_session(fake, &flag, |_, _| {}).await;
        assert_eq!(out.outcome, Outcome::Cancelled);
        assert_eq!(out.failure.as_deref(), Some("Malformed response from model: boom"));
        assert!(views.iter().any(|v| matches!(v, View::Error { .. })));
        assert_eq!(views.last(), Some(&View::Done));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_view_is_held_before_dismissal() {
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Err("boom"))]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runner = TaskRunner::new(fake, tx);
        let (controller, initial) = ReviewController::start("diff", settings());
        let flag = AtomicBool::new(false);
        let mut shown_at = None;
        let mut done_at = None;
        let out = run(controller, initial, &mut rx, &mut runner, &flag, |view| {
            match view {
                View::Error { .. } => shown_at = shown_at.or(Some(Instant::now())),
                View::Done => done_at = Some(Instant::now()),
                _ => {}
            }
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(out.outcome, Outcome::Cancelled);
        let held = done_at.unwrap() - shown_at.unwrap();
        assert!(held >= ERROR_HOLD, "error view held for {held:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_dismisses_error_view_early() {
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Err("boom"))]);
        let flag = AtomicBool::new(false);
        let start = Instant::now();
        let mut sent = false;
        let (out, views, _) = run_session(fake, &flag, |view, tx| {
            if matches!(view, View::Error { .. }) && !sent {
                sent = true;
                let _ = tx.send(key(KeyCode::Enter));
            }
        })
        .await;
        assert_eq!(out.outcome, Outcome::Cancelled);
        assert!(out.failure.is_some());
        assert_eq!(views.last(), Some(&View::Done));
        assert!(start.elapsed() < ERROR_HOLD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_applies_latest_result() {
        let fake = FakeGenerator::new(vec![
            (Duration::from_millis(100), Ok("feat: one")),
            (Duration::from_millis(100), Ok("feat: two")),
        ]);
        let flag = AtomicBool::new(false);
        let mut retried = false;
        let (out, _, _) = run_session(fake.clone(), &flag, |view, tx| {
            if let View::Review { message } = view {
                if !retried {
                    assert_eq!(message, "feat: one");
                    retried = true;
                    let _ = tx.send(key(KeyCode::Char('r')));
                } else {
                    let _ = tx.send(key(KeyCode::Enter));
                }
            }
        })
        .await;
        assert_eq!(out.message, "feat: two");
        assert_eq!(fake.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_while_loading() {
        let fake = FakeGenerator::new(vec![(Duration::from_secs(10), Ok("late"))]);
        let flag = AtomicBool::new(false);
        let mut sent = false;
        let (out, views, runner) = run_session(fake, &flag, |view, tx| {
            if matches!(view, View::Loading { .. }) && !sent {
                sent = true;
                let _ = tx.send(key(KeyCode::Char('q')));
            }
        })
        .await;
        assert_eq!(out.outcome, Outcome::Cancelled);
        assert_eq!(out.message, "");
        assert_eq!(out.failure, None);
        assert!(!views.iter().any(|v| matches!(v, View::Review { .. })));
        assert_eq!(runner.active_epoch(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sigterm_cancels_session() {
        let fake = FakeGenerator::new(vec![(Duration::from_secs(10), Ok("late"))]);
        let flag = AtomicBool::new(true);
        let (out, _, _) = run_session(fake, &flag, |_, _| {}).await;
        assert_eq!(out.outcome, Outcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_cancels_session() {
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Ok("feat: x"))]);
        let flag = AtomicBool::new(false);
        let (out, _, _) = run_session(fake, &flag, |view, tx| {
            if matches!(view, View::Review { .. }) {
                let _ = tx.send(AppEvent::Quit);
            }
        })
        .await;
        assert_eq!(out.outcome, Outcome::Cancelled);
        assert_eq!(out.message, "feat: x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_error_is_returned() {
        let fake = FakeGenerator::new(vec![(Duration::from_secs(10), Ok("late"))]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runner = TaskRunner::new(fake, tx);
        let (controller, initial) = ReviewController::start("diff", settings());
        let flag = AtomicBool::new(false);
        let err = run(controller, initial, &mut rx, &mut runner, &flag, |_| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(runner.active_epoch(), None);
    }
}
