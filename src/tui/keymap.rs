//! Key bindings.
//!
//! Translating keys into [`Command`]s is kept free of state so the bindings
//! can be tested without an `App`.

use super::app::{Focus, Tab};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Lines moved by PageUp/PageDown.
pub const PAGE_SIZE: usize = 10;

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    SelectTab(Tab),
    NextTab,
    ToggleFocus,

    // SQL tab
    RunQuery,
    Indent,
    ClearQuery,

    // Ask AI tab
    Send,
    SendSuggestion(usize),

    // Text editing
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,

    // Output scrolling
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollTop,
    ScrollBottom,
}

/// Maps a key press to a command for the active tab and focus.
pub fn map_key(tab: Tab, focus: Focus, key: KeyEvent) -> Option<Command> {
    if let Some(command) = map_global(key) {
        return Some(command);
    }

    let tab_command = match tab {
        Tab::Sql => map_sql(key),
        Tab::Ai => map_ai(key, focus),
    };
    if tab_command.is_some() {
        return tab_command;
    }

    match focus {
        Focus::Input => map_editing(key),
        Focus::Output => map_scrolling(key),
    }
}

fn map_global(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(Command::Quit),
        KeyCode::F(1) => Some(Command::SelectTab(Tab::Sql)),
        KeyCode::F(2) => Some(Command::SelectTab(Tab::Ai)),
        KeyCode::BackTab => Some(Command::NextTab),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(Command::NextTab),
        KeyCode::Esc => Some(Command::ToggleFocus),
        KeyCode::PageUp => Some(Command::ScrollUp(PAGE_SIZE)),
        KeyCode::PageDown => Some(Command::ScrollDown(PAGE_SIZE)),
        _ => None,
    }
}

fn map_sql(key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter if ctrl => Some(Command::RunQuery),
        KeyCode::Char('r') if ctrl => Some(Command::RunQuery),
        KeyCode::F(5) => Some(Command::RunQuery),
        KeyCode::Char('l') if ctrl => Some(Command::ClearQuery),
        KeyCode::Tab => Some(Command::Indent),
        _ => None,
    }
}

fn map_ai(key: KeyEvent, focus: Focus) -> Option<Command> {
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char(c @ '1'..='9') if alt => {
            Some(Command::SendSuggestion(c as usize - '1' as usize))
        }
        KeyCode::Enter if alt || shift => Some(Command::Newline),
        KeyCode::Enter if focus == Focus::Input => Some(Command::Send),
        _ => None,
    }
}

fn map_editing(key: KeyEvent) -> Option<Command> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(Command::Insert(c)),
        KeyCode::Enter => Some(Command::Newline),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Delete => Some(Command::Delete),
        KeyCode::Left => Some(Command::Left),
        KeyCode::Right => Some(Command::Right),
        KeyCode::Up => Some(Command::Up),
        KeyCode::Down => Some(Command::Down),
        KeyCode::Home => Some(Command::Home),
        KeyCode::End => Some(Command::End),
        _ => None,
    }
}

fn map_scrolling(key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Up => Some(Command::ScrollUp(1)),
        KeyCode::Down => Some(Command::ScrollDown(1)),
        KeyCode::Home => Some(Command::ScrollTop),
        KeyCode::End => Some(Command::ScrollBottom),
        _ => None,
    }
}
