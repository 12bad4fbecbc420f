//! Terminal lifecycle management for aicommit.
//!
//! The review screen is an inline viewport on stderr: it occupies a few rows
//! below the prompt instead of taking over the alternate screen, so the
//! surrounding shell output stays visible and stdout is left free for the
//! final commit summary.

use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::{Terminal, TerminalOptions, Viewport};
use signal_hook::consts::SIGTERM;
use signal_hook::flag::register;
use std::io::{stderr, BufWriter, Stderr};
use std::panic;
use std::sync::{atomic::AtomicBool, Arc};

/// Rows reserved for the inline viewport.
pub const INLINE_HEIGHT: u16 = 12;

/// CrosstermBackend over a buffered stderr writer.
///
/// `BufWriter<Stderr>` batches escape sequences into fewer write(2) syscalls.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Initialise the terminal for TUI rendering.
///
/// Enables raw mode and reserves an [`INLINE_HEIGHT`]-row viewport. Call
/// [`restore_tui`] at every exit path.
///
/// # Errors
///
/// Returns `Err` if `enable_raw_mode` or `Terminal::with_options` fails.
pub fn init_tui() -> std::io::Result<Tui> {
    enable_raw_mode()?;
    Terminal::with_options(
        CrosstermBackend::new(BufWriter::new(stderr())),
        TerminalOptions { viewport: Viewport::Inline(INLINE_HEIGHT) },
    )
}

/// Restore the terminal to its pre-TUI state.
///
/// Disables raw mode and shows the cursor. Idempotent; ratatui does not
/// restore the terminal on `Drop`, so this runs on every exit path including
/// the panic hook.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), Show)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic message.
///
/// Must be called **before** [`init_tui`]. Chains onto the previously installed
/// hook so the default panic printer still runs after the terminal is restored.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Best-effort only: we are already panicking.
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

/// Register a SIGTERM handler that sets an `AtomicBool` flag.
///
/// The flag flips to `true` when the process receives SIGTERM; the event loop
/// polls it on a 50 ms heartbeat.
pub fn register_sigterm() -> std::io::Result<Arc<AtomicBool>> {
    let term = Arc::new(AtomicBool::new(false));
    register(SIGTERM, Arc::clone(&term))?;
    Ok(term)
}
