//! Result panel for the SQL tab.
//!
//! Draws a [`ResultView`]: auto-sized table columns, NULL cells as a dimmed
//! placeholder, and distinct error and empty panels.

use super::chat::wrapped_height;
use crate::render::{Cell, ResultView, TableView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 3;

const NULL_PLACEHOLDER: &str = "∅ NULL";

fn border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn width_of(s: &str) -> usize {
    s.chars().count()
}

/// Truncates to `max_width` chars, ending with `...` when cut.
fn truncate(s: &str, max_width: usize) -> String {
    if width_of(s) <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    }
}

fn cell_text(cell: &Cell) -> &str {
    match cell {
        Cell::Value(v) => v,
        Cell::Null => NULL_PLACEHOLDER,
    }
}

/// Column widths including the ordinal column.
fn column_widths(table: &TableView) -> Vec<usize> {
    let mut widths: Vec<usize> = table
        .headers
        .iter()
        .map(|h| width_of(h).max(MIN_COLUMN_WIDTH))
        .collect();

    for row in &table.rows {
        if let Some(w) = widths.first_mut() {
            *w = (*w).max(width_of(&row.ordinal));
        }
        for (i, cell) in row.cells.iter().enumerate() {
            if let Some(w) = widths.get_mut(i + 1) {
                *w = (*w).max(width_of(cell_text(cell)));
            }
        }
    }

    widths.into_iter().map(|w| w.min(MAX_COLUMN_WIDTH)).collect()
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> Line<'static> {
    let mut line = String::new();
    line.push(left);
    for (i, &width) in widths.iter().enumerate() {
        line.push_str(&"─".repeat(width + 2));
        if i + 1 < widths.len() {
            line.push(mid);
        }
    }
    line.push(right);
    Line::from(Span::styled(line, border_style()))
}

fn padded(text: &str, width: usize) -> String {
    format!(" {:width$} ", truncate(text, width))
}

fn header_row(table: &TableView, widths: &[usize]) -> Line<'static> {
    let mut spans = vec![Span::styled("│", border_style())];
    for (i, header) in table.headers.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(MIN_COLUMN_WIDTH);
        let style = if i == 0 {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        };
        spans.push(Span::styled(padded(header, width), style));
        spans.push(Span::styled("│", border_style()));
    }
    Line::from(spans)
}

fn data_row(ordinal: &str, cells: &[Cell], widths: &[usize]) -> Line<'static> {
    let mut spans = vec![Span::styled("│", border_style())];
    let ordinal_width = widths.first().copied().unwrap_or(MIN_COLUMN_WIDTH);
    spans.push(Span::styled(
        padded(ordinal, ordinal_width),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled("│", border_style()));

    for (i, cell) in cells.iter().enumerate() {
        let width = widths.get(i + 1).copied().unwrap_or(MIN_COLUMN_WIDTH);
        let style = if cell.is_null() {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
        };
        spans.push(Span::styled(padded(cell_text(cell), width), style));
        spans.push(Span::styled("│", border_style()));
    }
    Line::from(spans)
}

/// Renders a populated table: summary, borders, header and every row.
pub fn table_lines(table: &TableView) -> Vec<Line<'static>> {
    let widths = column_widths(table);
    let mut lines = Vec::with_capacity(table.rows.len() + 5);

    lines.push(Line::from(vec![
        Span::styled("✓ ", Style::default().fg(Color::Green)),
        Span::styled(table.summary(), Style::default().fg(Color::Gray)),
    ]));
    lines.push(border(&widths, '┌', '┬', '┐'));
    lines.push(header_row(table, &widths));
    lines.push(border(&widths, '├', '┼', '┤'));
    for row in &table.rows {
        lines.push(data_row(&row.ordinal, &row.cells, &widths));
    }
    lines.push(border(&widths, '└', '┴', '┘'));
    lines
}

/// Lines for any result state.
pub fn result_lines(view: &ResultView) -> Vec<Line<'static>> {
    match view {
        ResultView::Nothing => vec![Line::from(Span::styled(
            "Press Ctrl+Enter, Ctrl+R or F5 to run the query.",
            Style::default().fg(Color::DarkGray),
        ))],
        ResultView::Error(message) => {
            let style = Style::default().fg(Color::Red);
            let mut lines = vec![Line::from(Span::styled(
                "✗ Query Error",
                style.add_modifier(Modifier::BOLD),
            ))];
            lines.extend(
                message
                    .split('\n')
                    .map(|l| Line::from(Span::styled(l.to_string(), style))),
            );
            lines
        }
        ResultView::Empty => vec![Line::from(vec![
            Span::styled("✓ ", Style::default().fg(Color::Green)),
            Span::styled(
                ResultView::EMPTY_MESSAGE,
                Style::default().fg(Color::Gray),
            ),
        ])],
        ResultView::Table(table) => table_lines(table),
    }
}

/// The bordered result area.
pub struct ResultPanel<'a> {
    view: &'a ResultView,
    scroll: usize,
    focused: bool,
}

impl<'a> ResultPanel<'a> {
    pub fn new(view: &'a ResultView, scroll: usize, focused: bool) -> Self {
        Self {
            view,
            scroll,
            focused,
        }
    }

    /// Largest useful offset from the top when drawn into `area`.
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        content_height(self.view, &result_lines(self.view), inner.width as usize)
            .saturating_sub(inner.height as usize)
    }
}

/// Error panels wrap; everything else is one row per line.
fn content_height(view: &ResultView, lines: &[Line], width: usize) -> usize {
    match view {
        ResultView::Error(_) => wrapped_height(lines, width),
        _ => lines.len(),
    }
}

impl Widget for ResultPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            border_style()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Results ");

        let lines = result_lines(self.view);
        let inner = block.inner(area);
        let max_scroll = content_height(self.view, &lines, inner.width as usize)
            .saturating_sub(inner.height as usize);
        let scroll = self.scroll.min(max_scroll).min(u16::MAX as usize) as u16;

        let mut paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
        if matches!(self.view, ResultView::Error(_)) {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        paragraph.render(area, buf);
    }
}
