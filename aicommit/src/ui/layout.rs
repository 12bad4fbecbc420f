//! Layout helpers for the review screen.
//!
//! This module is pure layout arithmetic plus the two pieces of chrome every
//! view shares: the rounded message box and the one-row hint line. It is called
//! inside `terminal.draw()` on every render so each frame reflects the current
//! viewport size.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::theme::Theme;

/// Returns `[body, hints]` for the current frame: the body fills the viewport
/// except for a one-row hint line at the bottom.
///
/// # Arguments
///
/// * `frame` — current render frame (provides `frame.area()` with the viewport size)
pub fn compute_layout(frame: &Frame) -> [Rect; 2] {
    frame
        .area()
        .layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]))
}

/// Returns the inner `Rect` of a box after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds the rounded box that frames the commit message.
///
/// # Arguments
///
/// * `title` — shown in the top border
/// * `editing` — `true` while the editor is active (switches the border color)
/// * `theme` — active color theme
pub fn message_block<'a>(title: &'a str, editing: bool, theme: &Theme) -> Block<'a> {
    let border = if editing { theme.border_editing } else { theme.border };
    Block::bordered()
        .title(Span::styled(
            title,
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
}

/// Renders `Confirm: [Enter] | Edit: [e] | ...` into `area`.
///
/// Renders nothing when `hints` is empty.
pub fn render_hint_line(
    frame: &mut Frame,
    area: Rect,
    hints: &[(&str, &str)],
    theme: &Theme,
) {
    if hints.is_empty() {
        return;
    }
    let text_style = Style::default().fg(theme.hint_text);
    let key_style = Style::default().fg(theme.hint_key);

    let mut spans = Vec::with_capacity(hints.len() * 4);
    for (i, (action, keys)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", text_style));
        }
        spans.push(Span::styled(format!("{action}: "), text_style));
        spans.push(Span::styled(format!("[{keys}]"), key_style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
