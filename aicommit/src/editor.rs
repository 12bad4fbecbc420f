//! Minimal editable text buffer for the `Editing` phase.
//!
//! The cursor is a char index, not a byte offset, so multi-byte characters
//! are never split. Every operation is total: moving past either end or
//! deleting at a boundary is a no-op.

/// Text buffer with a cursor clamped to `[0, char_count]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditor {
    text: String,
    cursor: usize,
}

impl TextEditor {
    /// Creates an editor holding `text` with the cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let mut editor = Self::default();
        editor.load(text);
        editor
    }

    /// Replaces the buffer with `text` and moves the cursor to the end.
    ///
    /// The text is stored as-is; embedded newlines survive a load/extract
    /// round trip unchanged.
    pub fn load(&mut self, text: &str) {
        self.text = text.to_owned();
        self.cursor = self.char_count();
    }

    /// Inserts `c` before the cursor and advances the cursor past it.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Removes the char before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    /// Removes the char under the cursor.
    pub fn delete(&mut self) {
        if self.cursor >= self.char_count() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Current buffer contents.
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Cursor position as a char index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Consumes the editor and returns the buffer.
    pub fn into_value(self) -> String {
        self.text
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_places_cursor_at_end() {
        let editor = TextEditor::from_text("feat: add");
        assert_eq!(editor.value(), "feat: add");
        assert_eq!(editor.cursor(), 9);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut editor = TextEditor::from_text("fix typo");
        editor.move_cursor_home();
        for _ in 0..3 {
            editor.move_cursor_right();
        }
        editor.insert_char(':');
        assert_eq!(editor.value(), "fix: typo");
        assert_eq!(editor.cursor(), 4);
    }

    #[test]
    fn test_backspace_and_delete_at_boundaries_are_noops() {
        let mut editor = TextEditor::from_text("ab");
        editor.delete();
        assert_eq!(editor.value(), "ab");
        editor.move_cursor_home();
        editor.backspace();
        assert_eq!(editor.value(), "ab");
        assert_eq!(editor.cursor(), 0);
        editor.delete();
        assert_eq!(editor.value(), "b");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut editor = TextEditor::from_text("x");
        editor.move_cursor_right();
        editor.move_cursor_right();
        assert_eq!(editor.cursor(), 1);
        editor.move_cursor_left();
        editor.move_cursor_left();
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_multibyte_chars_are_not_split() {
        let mut editor = TextEditor::from_text("修复: 日志");
        assert_eq!(editor.cursor(), 6);
        editor.backspace();
        assert_eq!(editor.value(), "修复: 日");
        editor.move_cursor_left();
        editor.insert_char('é');
        assert_eq!(editor.value(), "修复: é日");
        assert_eq!(editor.cursor(), 5);
    }

    #[test]
    fn test_newlines_survive_round_trip() {
        let text = "feat(core): add parser\n\n- tokenizer\r\n- grammar\n";
        let editor = TextEditor::from_text(text);
        assert_eq!(editor.into_value(), text);
    }

    #[test]
    fn test_empty_buffer() {
        let mut editor = TextEditor::default();
        editor.backspace();
        editor.delete();
        editor.move_cursor_end();
        assert_eq!(editor.cursor(), 0);
        editor.insert_char('a');
        assert_eq!(editor.value(), "a");
    }
}
