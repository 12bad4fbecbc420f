//! UI rendering module for aicommit.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. It draws whatever [`View`] the review controller
//! produced; no state is read or written here.

mod layout;
pub mod keybindings;

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Clear, Paragraph, Wrap},
};

use crate::app::View;
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, message_block, render_hint_line};

/// Braille spinner, one glyph per tick.
pub const SPINNER: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// Renders one complete frame for `view`.
///
/// # Arguments
///
/// * `frame` — current render frame provided by `terminal.draw()`
/// * `view` — render model from `ReviewController::view()`
/// * `theme` — active color theme
pub fn render(frame: &mut Frame, view: &View, theme: &Theme) {
    let [body, hints] = compute_layout(frame);
    frame.render_widget(Clear, frame.area());

    match view {
        View::Loading { spinner, attempt, provider } => {
            render_loading(frame, body, *spinner, *attempt, provider, theme);
        }
        View::Review { message } => render_review(frame, body, message, theme),
        View::Editing { text, cursor } => render_editing(frame, body, text, *cursor, theme),
        View::Error { reason } => render_error(frame, body, reason, theme),
        View::Done => {}
    }

    render_hint_line(frame, hints, view.hints(), theme);
}

fn render_loading(
    frame: &mut Frame,
    area: Rect,
    spinner: usize,
    attempt: u64,
    provider: &str,
    theme: &Theme,
) {
    let glyph = SPINNER[spinner % SPINNER.len()];
    let mut spans = vec![
        Span::styled(format!("{glyph} "), Style::default().fg(theme.spinner)),
        Span::styled(
            format!("Generating commit message with {provider}..."),
            Style::default().fg(theme.status),
        ),
    ];
    if attempt > 1 {
        spans.push(Span::styled(
            format!(" (attempt {attempt})"),
            Style::default().fg(theme.placeholder),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_review(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = if message.trim().is_empty() {
        Text::styled("(empty)", Style::default().fg(theme.placeholder))
    } else {
        Text::styled(message.to_owned(), Style::default().fg(theme.message))
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(message_block(" Commit message ", false, theme))
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Draws the buffer without wrapping so the (row, col) cursor maps directly
/// onto the inner area.
fn render_editing(
    frame: &mut Frame,
    area: Rect,
    text: &str,
    cursor: (usize, usize),
    theme: &Theme,
) {
    let inner = inner_rect(area);
    let row = u16::try_from(cursor.0).unwrap_or(u16::MAX);
    let col = u16::try_from(cursor.1).unwrap_or(u16::MAX);
    // Keep the cursor row and column visible on small viewports.
    let scroll_y = row.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = col.saturating_sub(inner.width.saturating_sub(1));

    frame.render_widget(
        Paragraph::new(Text::styled(text.to_owned(), Style::default().fg(theme.message)))
            .block(message_block(" Edit commit message ", true, theme))
            .scroll((scroll_y, scroll_x)),
        area,
    );

    if inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position(Position {
            x: inner.x.saturating_add(col.saturating_sub(scroll_x)),
            y: inner.y.saturating_add(row.saturating_sub(scroll_y)),
        });
    }
}

fn render_error(frame: &mut Frame, area: Rect, reason: &str, theme: &Theme) {
    let style = Style::default().fg(theme.error);
    let text = Text::from(vec![
        Line::styled(
            "✗ Failed to generate commit message",
            style.add_modifier(Modifier::BOLD),
        ),
        Line::styled(reason.to_owned(), style),
    ]);
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(view: &View) -> (String, Terminal<TestBackend>) {
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        let theme = Theme::dark();
        terminal.draw(|frame| render(frame, view, &theme)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        (screen, terminal)
    }

    #[test]
    fn test_loading_shows_spinner_and_provider() {
        let (screen, _) = draw(&View::Loading {
            spinner: 1,
            attempt: 2,
            provider: "DeepSeek (deepseek-chat)".to_string(),
        });
        assert!(screen.contains("⣽ Generating commit message with DeepSeek (deepseek-chat)..."));
        assert!(screen.contains("(attempt 2)"));
        assert!(screen.contains("Cancel: [q/Esc]"));
    }

    #[test]
    fn test_review_shows_message_and_hints() {
        let (screen, _) = draw(&View::Review { message: "feat: add parser".to_string() });
        assert!(screen.contains("feat: add parser"));
        assert!(screen.contains("Commit message"));
        assert!(screen.contains("Confirm: [Enter] | Edit: [e] | Retry: [r] | Cancel: [q/Esc]"));
    }

    #[test]
    fn test_review_placeholder_for_empty_draft() {
        let (screen, _) = draw(&View::Review { message: "  ".to_string() });
        assert!(screen.contains("(empty)"));
    }

    #[test]
    fn test_editing_places_cursor() {
        let (screen, mut terminal) = draw(&View::Editing {
            text: "feat: a\nbody".to_string(),
            cursor: (1, 2),
        });
        assert!(screen.contains("Save: [Enter/Esc]"));
        let pos = terminal.get_cursor_position().unwrap();
        assert_eq!(pos, Position { x: 3, y: 2 });
    }

    #[test]
    fn test_editing_cursor_beyond_u16_stays_in_box() {
        let (_, mut terminal) = draw(&View::Editing {
            text: "x".to_string(),
            cursor: (70_000, 70_000),
        });
        // The box fills rows 0-6 above the hint line; its inner area ends at (78, 5).
        let pos = terminal.get_cursor_position().unwrap();
        assert_eq!(pos, Position { x: 78, y: 5 });
    }

    #[test]
    fn test_error_shows_reason() {
        let (screen, _) = draw(&View::Error { reason: "timeout after 30s".to_string() });
        assert!(screen.contains("Failed to generate commit message"));
        assert!(screen.contains("timeout after 30s"));
    }
}
