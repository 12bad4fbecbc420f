//! Event bus for aicommit.
//!
//! All user input, timer ticks, and generation results are normalised into a
//! single `AppEvent` enum and sent over a tokio unbounded MPSC channel. The
//! event loop receives from this channel and feeds the review controller.
//!
//! A single tick interval (100 ms) animates the loading spinner. There is no
//! separate render interval: the loop redraws after every event it handles.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::app::Completion;

/// Spinner tick period.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    ///
    /// Release and repeat events are filtered in [`spawn_event_task`] to avoid
    /// double-firing on Windows, which synthesises both press and release for
    /// every keystroke.
    Key(KeyEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Spinner tick.
    Tick,
    /// Terminal result of a generation attempt.
    Generation(Completion),
    /// The input stream ended or failed.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned and handed to the input task and the task
/// runner; the receiver (`rx`) is owned by the event loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that drives ticks and terminal input.
///
/// The task exits once the receiver is gone. `reader.next().fuse()` keeps
/// `tokio::select!` from polling a finished stream; when the stream ends or
/// errors the task sends `AppEvent::Quit` and stops.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick_interval = interval(TICK_INTERVAL);
        let mut reader = EventStream::new();

        loop {
            let tick = tick_interval.tick();
            let crossterm_event = reader.next().fuse();

            let delivered = tokio::select! {
                _ = tick => tx.send(AppEvent::Tick).is_ok(),
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            tx.send(AppEvent::Key(key)).is_ok()
                        }
                        Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)).is_ok(),
                        Some(Ok(_)) => true,
                        Some(Err(_)) | None => {
                            let _ = tx.send(AppEvent::Quit);
                            false
                        }
                    }
                }
            };
            if !delivered {
                break;
            }
        }
    })
}
