//! Editable text with a caret.
//!
//! Shared by the SQL editor and the conversation draft. The caret is a char
//! offset, so multi-byte text edits at character boundaries.

/// Text being edited plus the caret position (char index).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    caret: usize,
}

impl TextBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `text`, caret at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret position as a char offset.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Number of chars in the buffer.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Replaces the text and moves the caret to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.char_len();
    }

    /// Moves the caret, clamped to the text length.
    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.char_len());
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Inserts a character at the caret.
    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index(self.caret);
        self.text.insert(idx, c);
        self.caret += 1;
    }

    /// Inserts a string at the caret and advances past it.
    pub fn insert_str(&mut self, s: &str) {
        let idx = self.byte_index(self.caret);
        self.text.insert_str(idx, s);
        self.caret += s.chars().count();
    }

    /// Deletes the character before the caret.
    pub fn backspace(&mut self) {
        if self.caret > 0 {
            self.caret -= 1;
            let idx = self.byte_index(self.caret);
            self.text.remove(idx);
        }
    }

    /// Deletes the character at the caret.
    pub fn delete(&mut self) {
        if self.caret < self.char_len() {
            let idx = self.byte_index(self.caret);
            self.text.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.caret < self.char_len() {
            self.caret += 1;
        }
    }

    /// Moves to the start of the current line.
    pub fn move_home(&mut self) {
        let (line, _) = self.caret_position();
        self.caret = self.line_start(line);
    }

    /// Moves to the end of the current line.
    pub fn move_end(&mut self) {
        let (line, _) = self.caret_position();
        self.caret = self.line_start(line) + self.line_len(line);
    }

    /// Moves to the same column on the previous line, clamped to its length.
    pub fn move_up(&mut self) {
        let (line, col) = self.caret_position();
        if line > 0 {
            self.caret = self.line_start(line - 1) + col.min(self.line_len(line - 1));
        }
    }

    /// Moves to the same column on the next line, clamped to its length.
    pub fn move_down(&mut self) {
        let (line, col) = self.caret_position();
        if line + 1 < self.line_count() {
            self.caret = self.line_start(line + 1) + col.min(self.line_len(line + 1));
        }
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
    }

    /// Empties the buffer and returns the previous text.
    pub fn take(&mut self) -> String {
        self.caret = 0;
        std::mem::take(&mut self.text)
    }

    /// Returns true if the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of newline-delimited lines; an empty buffer has one.
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Caret as zero-based (line, column), both in chars.
    pub fn caret_position(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.caret) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn line_start(&self, line: usize) -> usize {
        self.text
            .split('\n')
            .take(line)
            .map(|l| l.chars().count() + 1)
            .sum()
    }

    fn line_len(&self, line: usize) -> usize {
        self.text
            .split('\n')
            .nth(line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }
}
