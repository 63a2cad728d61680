//! UTF-8 safe single-buffer text editing used by every form input.

use unicode_width::UnicodeWidthStr;

/// Mask character shown in place of password input.
pub const MASK_CHAR: char = '•';

#[derive(Clone, Debug, Default)]
pub struct TextInputState {
    input: String,
    /// Byte index into `input`, always on a char boundary.
    cursor: usize,
}

impl TextInputState {
    /// Buffer holding `text` with the cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let input = text.into();
        let cursor = input.len();
        Self { input, cursor }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.len();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    pub fn move_left(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Removes the char before the cursor.
    pub fn backspace(&mut self) -> bool {
        let Some(previous) = self.input[..self.cursor].chars().next_back() else {
            return false;
        };
        let start = self.cursor - previous.len_utf8();
        self.input.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Removes the char under the cursor.
    pub fn delete(&mut self) -> bool {
        let Some(next) = self.input[self.cursor..].chars().next() else {
            return false;
        };
        let end = self.cursor + next.len_utf8();
        self.input.drain(self.cursor..end);
        true
    }

    /// Text as displayed, masked when `secret`.
    pub fn display(&self, secret: bool) -> String {
        if secret {
            std::iter::repeat_n(MASK_CHAR, self.input.chars().count()).collect()
        } else {
            self.input.clone()
        }
    }

    /// Terminal column of the cursor relative to the start of the text.
    pub fn cursor_column(&self, secret: bool) -> u16 {
        let before = &self.input[..self.cursor];
        let width = if secret { before.chars().count() } else { before.width() };
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_respect_char_boundaries() {
        let mut state = TextInputState::with_text("héllo");
        state.move_home();
        state.move_right();
        state.move_right();
        assert!(state.backspace());
        assert_eq!(state.input(), "hllo");
        state.insert_char('é');
        assert_eq!(state.input(), "héllo");
        assert!(state.delete());
        assert_eq!(state.input(), "hélo");
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut state = TextInputState::default();
        assert!(!state.backspace());
        assert!(!state.delete());
        state.move_left();
        state.move_right();
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn masks_secret_text() {
        let state = TextInputState::with_text("abc");
        assert_eq!(state.display(true), "•••");
        assert_eq!(state.cursor_column(true), 3);
        assert_eq!(state.display(false), "abc");
    }
}
