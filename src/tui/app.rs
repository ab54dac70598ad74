//! Application state for the TUI.
//!
//! `App` owns both sessions and translates commands into session calls. It
//! never awaits: accepted triggers come back as [`Job`]s for the runner to
//! drive, and finished jobs return as [`AsyncMessage`]s through [`App::apply`].

use std::sync::Arc;

use crossterm::event::KeyEvent;
use tracing::debug;

use super::keymap::{self, Command};
use super::widgets::spinner::Spinner;
use crate::api::{AiResponse, Backend, QueryResult};
use crate::config::Config;
use crate::session::{
    Completion, ConversationSession, PendingRequest, Phase, QuerySession, Trigger,
};

/// The two top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Sql,
    Ai,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Sql => "SQL Query",
            Self::Ai => "Ask AI",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Sql => Self::Ai,
            Self::Ai => Self::Sql,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Sql => 0,
            Self::Ai => 1,
        }
    }
}

/// Which part of the active tab receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The SQL editor or the chat draft.
    #[default]
    Input,
    /// The result table or the transcript.
    Output,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// An accepted request waiting to be driven.
#[derive(Debug)]
pub enum Job {
    Query(PendingRequest<QueryResult>),
    Ask(PendingRequest<AiResponse>),
}

impl Job {
    /// Runs the request and wraps its completion for the event loop.
    pub async fn resolve(self) -> AsyncMessage {
        match self {
            Self::Query(pending) => AsyncMessage::QueryCompleted(pending.resolve().await),
            Self::Ask(pending) => AsyncMessage::AskCompleted(pending.resolve().await),
        }
    }
}

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum AsyncMessage {
    QueryCompleted(Completion<QueryResult>),
    AskCompleted(Completion<AiResponse>),
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    pub tab: Tab,
    pub focus: Focus,
    pub query: QuerySession,
    pub conversation: ConversationSession,
    /// Result area scroll offset (lines from top).
    pub result_scroll: usize,
    /// Transcript scroll offset (lines from bottom).
    pub chat_scroll: usize,
    /// Largest offsets the panels allowed at the last draw.
    result_max_scroll: usize,
    chat_max_scroll: usize,
    /// Backend description for the header.
    pub backend_label: String,
    pub query_spinner: Option<Spinner>,
    pub chat_spinner: Option<Spinner>,
    backend: Arc<dyn Backend>,
}

impl App {
    /// Creates the app with sessions seeded from `config`.
    pub fn new(backend: Arc<dyn Backend>, config: &Config) -> Self {
        Self {
            running: true,
            tab: Tab::default(),
            focus: Focus::default(),
            query: QuerySession::new(config.editor.placeholder.clone()),
            conversation: ConversationSession::new(config.chat.suggestions.clone()),
            result_scroll: 0,
            chat_scroll: 0,
            result_max_scroll: 0,
            chat_max_scroll: 0,
            backend_label: backend.describe(),
            query_spinner: None,
            chat_spinner: None,
            backend,
        }
    }

    /// True while either session has a request in flight.
    pub fn is_busy(&self) -> bool {
        self.query.is_running() || self.conversation.is_waiting()
    }

    /// Handles a key press, returning a job if a request was started.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Job> {
        let command = keymap::map_key(self.tab, self.focus, key)?;
        self.dispatch(command)
    }

    /// Applies a command to the active tab.
    pub fn dispatch(&mut self, command: Command) -> Option<Job> {
        match command {
            Command::Quit => {
                self.running = false;
            }
            Command::SelectTab(tab) => self.switch_tab(tab),
            Command::NextTab => self.switch_tab(self.tab.next()),
            Command::ToggleFocus => self.focus = self.focus.toggle(),

            Command::RunQuery => return self.run_query(),
            Command::Indent => self.query.insert_indent(),
            Command::ClearQuery => {
                self.query.clear();
                self.query_spinner = None;
                self.result_scroll = 0;
            }

            Command::Send => return self.send_draft(),
            Command::SendSuggestion(index) => return self.send_suggestion(index),

            Command::ScrollUp(n) => self.scroll_up(n),
            Command::ScrollDown(n) => self.scroll_down(n),
            Command::ScrollTop => match self.tab {
                Tab::Sql => self.result_scroll = 0,
                Tab::Ai => self.chat_scroll = self.chat_max_scroll,
            },
            Command::ScrollBottom => match self.tab {
                Tab::Sql => self.result_scroll = self.result_max_scroll,
                Tab::Ai => self.chat_scroll = 0,
            },

            edit => self.edit(edit),
        }
        None
    }

    /// Applies a finished job to its session.
    pub fn apply(&mut self, message: AsyncMessage) {
        match message {
            AsyncMessage::QueryCompleted(completion) => {
                if self.query.complete(completion) {
                    self.result_scroll = 0;
                }
                if !self.query.is_running() {
                    self.query_spinner = None;
                }
            }
            AsyncMessage::AskCompleted(completion) => {
                if self.conversation.complete(completion) {
                    self.chat_scroll = 0;
                }
                if !self.conversation.is_waiting() {
                    self.chat_spinner = None;
                }
            }
        }
        self.finalize();
    }

    /// Returns keyboard focus to the active tab's input.
    pub fn finalize(&mut self) {
        self.focus = Focus::Input;
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            debug!("Switching to tab {:?}", tab);
            self.tab = tab;
            self.focus = Focus::Input;
        }
    }

    fn run_query(&mut self) -> Option<Job> {
        match self.query.run(&self.backend) {
            Trigger::Started(pending) => {
                self.query_spinner = Some(Spinner::executing());
                self.result_scroll = 0;
                Some(Job::Query(pending))
            }
            Trigger::Rejected => {
                self.finalize();
                None
            }
        }
    }

    fn send_draft(&mut self) -> Option<Job> {
        let trigger = self.conversation.submit_draft(&self.backend);
        self.start_ask(trigger)
    }

    fn send_suggestion(&mut self, index: usize) -> Option<Job> {
        if self.tab != Tab::Ai {
            return None;
        }
        let trigger = self.conversation.submit_suggestion(index, &self.backend);
        self.start_ask(trigger)
    }

    fn start_ask(&mut self, trigger: Trigger<AiResponse>) -> Option<Job> {
        match trigger {
            Trigger::Started(pending) => {
                self.chat_spinner = Some(Spinner::thinking());
                self.chat_scroll = 0;
                Some(Job::Ask(pending))
            }
            Trigger::Rejected => {
                self.finalize();
                None
            }
        }
    }

    fn edit(&mut self, command: Command) {
        let buffer = match self.tab {
            Tab::Sql => self.query.editor_mut(),
            Tab::Ai => self.conversation.draft_mut(),
        };
        match command {
            Command::Insert(c) => buffer.insert(c),
            Command::Newline => buffer.insert('\n'),
            Command::Backspace => buffer.backspace(),
            Command::Delete => buffer.delete(),
            Command::Left => buffer.move_left(),
            Command::Right => buffer.move_right(),
            Command::Up => buffer.move_up(),
            Command::Down => buffer.move_down(),
            Command::Home => buffer.move_home(),
            Command::End => buffer.move_end(),
            _ => {}
        }
    }

    fn scroll_up(&mut self, n: usize) {
        match self.tab {
            Tab::Sql => self.result_scroll = self.result_scroll.saturating_sub(n),
            Tab::Ai => {
                self.chat_scroll = self.chat_scroll.saturating_add(n).min(self.chat_max_scroll)
            }
        }
    }

    fn scroll_down(&mut self, n: usize) {
        match self.tab {
            Tab::Sql => {
                self.result_scroll = self.result_scroll.saturating_add(n).min(self.result_max_scroll)
            }
            Tab::Ai => self.chat_scroll = self.chat_scroll.saturating_sub(n),
        }
    }

    /// Records how far the result panel can scroll at its current size.
    pub fn limit_result_scroll(&mut self, max: usize) {
        self.result_max_scroll = max;
        self.result_scroll = self.result_scroll.min(max);
    }

    /// Records how far the transcript can scroll up at its current size.
    pub fn limit_chat_scroll(&mut self, max: usize) {
        self.chat_max_scroll = max;
        self.chat_scroll = self.chat_scroll.min(max);
    }

    /// Reads one field of the app by name, for headless state assertions.
    pub fn state_field(&self, field: &str) -> Option<String> {
        let value = match field {
            "tab" => format!("{:?}", self.tab),
            "focus" => format!("{:?}", self.focus),
            "running" => self.running.to_string(),
            "query_text" => self.query.query_text().to_string(),
            "query_phase" => self.query.phase().to_string(),
            "result" => self.query.view().kind().to_string(),
            "row_count" => self
                .query
                .result()
                .map(|r| r.row_count)
                .unwrap_or(0)
                .to_string(),
            "error" => self.query.error().unwrap_or_default().to_string(),
            "chat_phase" => self.conversation.phase().to_string(),
            "draft_text" => self.conversation.draft().text().to_string(),
            "message_count" => self.conversation.transcript().len().to_string(),
            "is_busy" => self.is_busy().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Phase shown in the header for whichever tab is active.
    pub fn active_phase(&self) -> Phase {
        match self.tab {
            Tab::Sql => self.query.phase(),
            Tab::Ai => self.conversation.phase(),
        }
    }
}
