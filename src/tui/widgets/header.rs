//! Header and tab bar widgets.

use super::spinner::Spinner;
use crate::tui::app::Tab;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Tabs, Widget},
};

/// Header bar: app name, busy indicator, backend.
pub struct Header<'a> {
    backend_label: &'a str,
    spinner: Option<&'a Spinner>,
}

impl<'a> Header<'a> {
    pub fn new(backend_label: &'a str, spinner: Option<&'a Spinner>) -> Self {
        Self {
            backend_label,
            spinner,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left = format!(" QueryDesk v{}", env!("CARGO_PKG_VERSION"));
        buf.set_string(area.x, area.y, &left, style);

        if let Some(spinner) = self.spinner {
            let text = spinner.display();
            let width = text.chars().count() as u16;
            let x = area.x + area.width.saturating_sub(width) / 2;
            buf.set_string(x, area.y, &text, style.fg(Color::Yellow));
        }

        let right = format!(" [{}] ", self.backend_label);
        let right_width = right.chars().count() as u16;
        let left_width = left.chars().count() as u16;
        if right_width + left_width < area.width {
            let x = area.right().saturating_sub(right_width);
            buf.set_string(x, area.y, &right, style.remove_modifier(Modifier::BOLD));
        }
    }
}

/// Tab selector with the function key for each tab.
pub struct TabBar {
    active: Tab,
}

impl TabBar {
    pub fn new(active: Tab) -> Self {
        Self { active }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let titles = [Tab::Sql, Tab::Ai].iter().enumerate().map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!("F{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(tab.title()),
            ])
        });

        Tabs::new(titles)
            .select(self.active.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider("│")
            .render(area, buf);
    }
}
