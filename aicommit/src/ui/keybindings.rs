//! Key translation for aicommit.
//!
//! Maps raw crossterm `KeyEvent`s onto the controller's [`Key`] alphabet. The
//! mapping is phase-independent: whether `q` quits or inserts a letter is the
//! controller's decision, not this module's.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Key;

/// Translates a key press into a controller [`Key`].
///
/// Returns `None` for keys the controller never reacts to (function keys,
/// Tab, arrows other than left/right, unhandled Ctrl chords).
///
/// # Arguments
///
/// * `key` — the raw crossterm key event (code + modifiers)
pub fn translate(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Key::Interrupt),
            KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Home),
            KeyCode::Char('e') | KeyCode::Char('E') => Some(Key::End),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::Delete),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
        translate(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(press(KeyCode::Enter, KeyModifiers::NONE), Some(Key::Enter));
        assert_eq!(press(KeyCode::Esc, KeyModifiers::NONE), Some(Key::Esc));
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::NONE), Some(Key::Char('q')));
        assert_eq!(press(KeyCode::Home, KeyModifiers::NONE), Some(Key::Home));
        assert_eq!(press(KeyCode::Delete, KeyModifiers::NONE), Some(Key::Delete));
    }

    #[test]
    fn test_shifted_chars_pass_through() {
        assert_eq!(press(KeyCode::Char('Q'), KeyModifiers::SHIFT), Some(Key::Char('Q')));
        assert_eq!(press(KeyCode::Char('ü'), KeyModifiers::NONE), Some(Key::Char('ü')));
    }

    #[test]
    fn test_control_chords() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Key::Interrupt));
        assert_eq!(press(KeyCode::Char('a'), KeyModifiers::CONTROL), Some(Key::Home));
        assert_eq!(press(KeyCode::Char('e'), KeyModifiers::CONTROL), Some(Key::End));
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::CONTROL), None);
    }

    #[test]
    fn test_ignored_keys() {
        assert_eq!(press(KeyCode::Tab, KeyModifiers::NONE), None);
        assert_eq!(press(KeyCode::Up, KeyModifiers::NONE), None);
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), None);
    }
}
