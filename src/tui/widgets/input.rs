//! Multi-line text input used by the SQL editor and the chat draft.
//!
//! Scrolls in both directions to keep the caret visible and can draw a
//! line-number gutter.

use crate::session::TextBuffer;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Number of leading items to skip so `cursor` stays within `available`.
pub fn calculate_scroll_offset(cursor: usize, available: usize) -> usize {
    if cursor < available {
        0
    } else {
        cursor + 1 - available.max(1)
    }
}

/// Bordered text area over a [`TextBuffer`].
pub struct TextInput<'a> {
    buffer: &'a TextBuffer,
    title: &'a str,
    focused: bool,
    line_numbers: bool,
    placeholder: Option<&'a str>,
}

impl<'a> TextInput<'a> {
    pub fn new(buffer: &'a TextBuffer, title: &'a str, focused: bool) -> Self {
        Self {
            buffer,
            title,
            focused,
            line_numbers: false,
            placeholder: None,
        }
    }

    /// Draws 1-based line numbers to the left of the text.
    pub fn with_line_numbers(mut self) -> Self {
        self.line_numbers = true;
        self
    }

    /// Text shown dimmed while the buffer is empty.
    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    fn gutter_width(&self) -> u16 {
        if self.line_numbers {
            // digits + " │ "
            self.buffer.line_count().to_string().len() as u16 + 3
        } else {
            0
        }
    }

    fn inner(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }

    fn offsets(&self, inner: Rect) -> (usize, usize) {
        let (line, col) = self.buffer.caret_position();
        let text_width = inner.width.saturating_sub(self.gutter_width()) as usize;
        (
            calculate_scroll_offset(line, inner.height as usize),
            calculate_scroll_offset(col, text_width),
        )
    }

    /// Terminal position of the caret when drawn into `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let inner = Self::inner(area);
        let (line, col) = self.buffer.caret_position();
        let (row_offset, col_offset) = self.offsets(inner);
        let x = inner.x + self.gutter_width() + (col - col_offset) as u16;
        let y = inner.y + (line - row_offset) as u16;
        (x.min(inner.right().saturating_sub(1)), y.min(inner.bottom().saturating_sub(1)))
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.title));

        let inner = Self::inner(area);
        let (row_offset, col_offset) = self.offsets(inner);
        let digits = self.buffer.line_count().to_string().len();
        let gutter_style = Style::default().fg(Color::DarkGray);

        let lines: Vec<Line> = if self.buffer.text().is_empty() && self.placeholder.is_some() {
            let mut spans = Vec::new();
            if self.line_numbers {
                spans.push(Span::styled(format!("{:>digits$} │ ", 1), gutter_style));
            }
            spans.push(Span::styled(
                self.placeholder.unwrap_or_default(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
            vec![Line::from(spans)]
        } else {
            self.buffer
                .text()
                .split('\n')
                .enumerate()
                .skip(row_offset)
                .take(inner.height as usize)
                .map(|(i, text)| {
                    let mut spans = Vec::new();
                    if self.line_numbers {
                        spans.push(Span::styled(format!("{:>digits$} │ ", i + 1), gutter_style));
                    }
                    let visible: String = text.chars().skip(col_offset).collect();
                    spans.push(Span::raw(visible));
                    Line::from(spans)
                })
                .collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
