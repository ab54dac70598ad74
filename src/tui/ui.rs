//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus, Tab};
use super::widgets::{chat, header, input, table};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const SQL_PLACEHOLDER: &str = "-- Write your SQL query here...";
const CHAT_PLACEHOLDER: &str = "Ask a question about your data...";

/// Renders the entire UI.
///
/// Also records the scroll limits of the visible output panel, so scroll
/// commands stay within the content.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Tabs
            Constraint::Min(3),    // Active tab
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    let spinner = app.query_spinner.as_ref().or(app.chat_spinner.as_ref());
    frame.render_widget(header::Header::new(&app.backend_label, spinner), main_layout[0]);
    frame.render_widget(header::TabBar::new(app.tab), main_layout[1]);

    match app.tab {
        Tab::Sql => render_sql(frame, main_layout[2], app),
        Tab::Ai => render_ai(frame, main_layout[2], app),
    }

    render_hints(frame, main_layout[3], app);
}

/// Height of a bordered text area showing `lines` lines, clamped.
fn input_height(lines: usize, min: u16, max: u16) -> u16 {
    (lines as u16).saturating_add(2).clamp(min, max.max(min))
}

fn render_sql(frame: &mut Frame, area: Rect, app: &mut App) {
    let editor_height = input_height(app.query.editor().line_count(), 5, area.height / 2);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(editor_height),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    let input_focused = app.focus == Focus::Input;
    let editor = input::TextInput::new(app.query.editor(), "SQL Editor", input_focused)
        .with_line_numbers()
        .with_placeholder(SQL_PLACEHOLDER);
    if input_focused {
        frame.set_cursor_position(editor.cursor_position(layout[0]));
    }
    frame.render_widget(editor, layout[0]);

    let status = match &app.query_spinner {
        Some(spinner) => Span::styled(
            format!(" {}...", spinner.display()),
            Style::default().fg(Color::Yellow),
        ),
        None => Span::styled(
            format!(" {} line(s) · Ctrl+Enter to run", app.query.line_numbers().end()),
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(status)), layout[1]);

    let view = app.query.view();
    let max_scroll = table::ResultPanel::new(&view, 0, false).max_scroll(layout[2]);
    app.limit_result_scroll(max_scroll);
    frame.render_widget(
        table::ResultPanel::new(&view, app.result_scroll, app.focus == Focus::Output),
        layout[2],
    );
}

fn render_ai(frame: &mut Frame, area: Rect, app: &mut App) {
    let draft_height = input_height(app.conversation.draft().line_count(), 3, 8);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(draft_height)])
        .split(area);

    let max_scroll = chat_panel(app).max_scroll(layout[0]);
    app.limit_chat_scroll(max_scroll);
    frame.render_widget(chat_panel(app), layout[0]);

    let draft = app.conversation.draft();
    let input_focused = app.focus == Focus::Input;
    let input = input::TextInput::new(draft, "Message", input_focused)
        .with_placeholder(CHAT_PLACEHOLDER);
    if input_focused {
        frame.set_cursor_position(input.cursor_position(layout[1]));
    }
    frame.render_widget(input, layout[1]);
}

fn chat_panel(app: &App) -> chat::ChatPanel<'_> {
    chat::ChatPanel::new(
        app.conversation.transcript(),
        app.conversation.suggestions(),
        app.chat_spinner.as_ref(),
        app.chat_scroll,
        app.focus == Focus::Output,
    )
}

fn render_hints(frame: &mut Frame, area: Rect, app: &App) {
    let hints = match app.tab {
        Tab::Sql => "F5 run · Tab indent · Ctrl+L clear · Esc results · F2 Ask AI · Ctrl+Q quit",
        Tab::Ai => {
            "Enter send · Shift+Enter new line · Alt+1-9 suggestion · Esc transcript · F1 SQL · Ctrl+Q quit"
        }
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints,
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}
