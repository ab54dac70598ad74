//! Conversation session.
//!
//! The transcript is append-only and turn-serial: each accepted submit
//! appends a user message immediately and exactly one assistant message
//! (possibly an error) when its request settles.

use chrono::{DateTime, Local};
use std::sync::Arc;

use super::buffer::TextBuffer;
use super::lifecycle::{Completion, Phase, RequestLifecycle, Settled, Trigger};
use crate::api::{AiResponse, Backend};

const FALLBACK_ERROR: &str = "Something went wrong. Please try again.";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
    pub is_error: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, false)
    }

    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, true)
    }

    fn new(role: Role, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
            is_error,
        }
    }

    /// Hour and minute the message was created, e.g. `14:05`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// State of the Ask AI tab.
#[derive(Debug)]
pub struct ConversationSession {
    transcript: Vec<Message>,
    draft: TextBuffer,
    suggestions: Vec<String>,
    lifecycle: RequestLifecycle,
}

impl ConversationSession {
    /// Creates an empty conversation offering `suggestions` as shortcuts.
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            transcript: Vec::new(),
            draft: TextBuffer::new(),
            suggestions,
            lifecycle: RequestLifecycle::new("conversation", FALLBACK_ERROR),
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn draft(&self) -> &TextBuffer {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TextBuffer {
        &mut self.draft
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_waiting(&self) -> bool {
        self.lifecycle.is_in_flight()
    }

    /// Sends the current draft.
    pub fn submit_draft(&mut self, backend: &Arc<dyn Backend>) -> Trigger<AiResponse> {
        let text = self.draft.text().to_string();
        self.submit(&text, backend)
    }

    /// Sends the suggestion at `index`, ignoring the draft's contents.
    ///
    /// An out-of-range index is rejected like a blank submit.
    pub fn submit_suggestion(
        &mut self,
        index: usize,
        backend: &Arc<dyn Backend>,
    ) -> Trigger<AiResponse> {
        match self.suggestions.get(index).cloned() {
            Some(text) => self.submit(&text, backend),
            None => Trigger::Rejected,
        }
    }

    /// Appends the trimmed `text` as a user message and asks the backend.
    ///
    /// Rejected without any change when the text is blank or a question is
    /// already waiting for its answer.
    pub fn submit(&mut self, text: &str, backend: &Arc<dyn Backend>) -> Trigger<AiResponse> {
        let question = text.trim().to_string();
        if question.is_empty() {
            return Trigger::Rejected;
        }

        let backend = Arc::clone(backend);
        let sent = question.clone();
        let trigger = self
            .lifecycle
            .trigger(move || async move { backend.ask_ai(&sent).await });

        if trigger.is_started() {
            self.transcript.push(Message::user(question));
            self.draft.clear();
        }
        trigger
    }

    /// Appends the assistant's answer or error. Returns false if dropped.
    pub fn complete(&mut self, completion: Completion<AiResponse>) -> bool {
        match self.lifecycle.settle(completion) {
            Settled::Succeeded(answer) => {
                self.transcript.push(Message::assistant(answer.response));
                true
            }
            Settled::Failed(message) => {
                self.transcript.push(Message::assistant_error(message));
                true
            }
            Settled::Stale => false,
        }
    }
}
