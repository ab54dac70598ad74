//! Chat panel widget for the Ask AI tab.
//!
//! Displays the transcript with assistant answers rendered through the
//! inline markup renderer, a thinking bubble while a question is pending,
//! and numbered suggestions while the transcript is empty.

use super::spinner::Spinner;
use crate::render::{render_message, Fragment, RenderedLine};
use crate::session::{Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

fn fragment_span(fragment: &Fragment, base: Style) -> Span<'static> {
    match fragment {
        Fragment::Plain(t) => Span::styled(t.clone(), base),
        Fragment::Emphasis(t) => Span::styled(t.clone(), base.add_modifier(Modifier::ITALIC)),
        Fragment::Strong(t) => Span::styled(t.clone(), base.add_modifier(Modifier::BOLD)),
    }
}

/// Converts rendered message lines to styled ratatui lines.
pub fn styled_lines(rendered: &[RenderedLine], base: Style) -> Vec<Line<'static>> {
    rendered
        .iter()
        .map(|line| match line {
            RenderedLine::Spacer => Line::from(""),
            RenderedLine::OrderedItem { marker, fragments } => {
                let mut spans = vec![Span::styled(
                    format!("  {marker} "),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )];
                spans.extend(fragments.iter().map(|f| fragment_span(f, base)));
                Line::from(spans)
            }
            RenderedLine::Paragraph(fragments) => {
                Line::from(fragments.iter().map(|f| fragment_span(f, base)).collect::<Vec<_>>())
            }
        })
        .collect()
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, label_style) = match message.role {
        Role::User => ("You", Style::default().fg(Color::Green)),
        Role::Assistant if message.is_error => ("Error", Style::default().fg(Color::Red)),
        Role::Assistant => ("Assistant", Style::default().fg(Color::Cyan)),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(label, label_style.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", message.time_label()),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    if message.is_error {
        lines.extend(message.content.split('\n').map(|l| {
            Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Red)))
        }));
    } else {
        lines.extend(styled_lines(&render_message(&message.content), Style::default()));
    }
    lines.push(Line::from(""));
    lines
}

fn empty_state_lines(suggestions: &[String]) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Ask anything about your data",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Questions are answered by the AI backend in plain language.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];

    if !suggestions.is_empty() {
        lines.push(Line::from(Span::styled(
            "Try one of these:",
            Style::default().fg(Color::Yellow),
        )));
        for (i, suggestion) in suggestions.iter().take(9).enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  Alt+{}  ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(suggestion.clone()),
            ]));
        }
    }
    lines
}

/// Number of rows `lines` occupy when wrapped to `width`.
pub(super) fn wrapped_height(lines: &[Line], width: usize) -> usize {
    lines
        .iter()
        .map(|l| l.width().div_ceil(width.max(1)).max(1))
        .sum()
}

/// Chat panel widget.
pub struct ChatPanel<'a> {
    transcript: &'a [Message],
    suggestions: &'a [String],
    thinking: Option<&'a Spinner>,
    /// Lines scrolled up from the bottom.
    scroll: usize,
    focused: bool,
}

impl<'a> ChatPanel<'a> {
    pub fn new(
        transcript: &'a [Message],
        suggestions: &'a [String],
        thinking: Option<&'a Spinner>,
        scroll: usize,
        focused: bool,
    ) -> Self {
        Self {
            transcript,
            suggestions,
            thinking,
            scroll,
            focused,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        if self.transcript.is_empty() && self.thinking.is_none() {
            return empty_state_lines(self.suggestions);
        }

        let mut lines: Vec<Line<'static>> =
            self.transcript.iter().flat_map(message_lines).collect();

        if let Some(spinner) = self.thinking {
            lines.push(Line::from(Span::styled(
                "Assistant",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                spinner.display(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }

    /// Largest useful offset from the bottom when drawn into `area`.
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        wrapped_height(&self.lines(), inner.width as usize).saturating_sub(inner.height as usize)
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Conversation ");

        let inner = block.inner(area);
        let lines = self.lines();
        let total = wrapped_height(&lines, inner.width as usize);
        let bottom = total.saturating_sub(inner.height as usize);
        let offset = bottom.saturating_sub(self.scroll);

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((offset.min(u16::MAX as usize) as u16, 0))
            .render(area, buf);
    }
}
