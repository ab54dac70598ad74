//! SQL query session.
//!
//! Holds the editor text and the outcome of the last run. After a completed
//! run exactly one of `result` and `error` is set; before any run neither is.

use std::ops::RangeInclusive;
use std::sync::Arc;

use super::buffer::TextBuffer;
use super::lifecycle::{Completion, Phase, RequestLifecycle, Settled, Trigger};
use crate::api::{Backend, QueryResult};
use crate::render::table::{self, ResultView};

/// Indentation unit inserted by the Tab command.
pub const INDENT: &str = "  ";

const FALLBACK_ERROR: &str = "An unexpected error occurred";

/// State of the SQL tab.
#[derive(Debug)]
pub struct QuerySession {
    editor: TextBuffer,
    result: Option<QueryResult>,
    error: Option<String>,
    lifecycle: RequestLifecycle,
}

impl QuerySession {
    /// Creates a session whose editor starts with `placeholder`.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            editor: TextBuffer::with_text(placeholder),
            result: None,
            error: None,
            lifecycle: RequestLifecycle::new("query", FALLBACK_ERROR),
        }
    }

    pub fn query_text(&self) -> &str {
        self.editor.text()
    }

    pub fn caret(&self) -> usize {
        self.editor.caret()
    }

    pub fn editor(&self) -> &TextBuffer {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TextBuffer {
        &mut self.editor
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_in_flight()
    }

    /// Replaces the query text unconditionally.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.editor.set_text(text);
    }

    /// Inserts [`INDENT`] at the caret and moves the caret past it.
    pub fn insert_indent(&mut self) {
        self.editor.insert_str(INDENT);
    }

    /// One ordinal per newline-delimited line of the query; at least one.
    pub fn line_numbers(&self) -> RangeInclusive<usize> {
        1..=self.editor.line_count()
    }

    /// Runs the trimmed query text unless it is blank or a run is in flight.
    pub fn run(&mut self, backend: &Arc<dyn Backend>) -> Trigger<QueryResult> {
        let query = self.editor.text().trim().to_string();
        if query.is_empty() {
            return Trigger::Rejected;
        }

        let backend = Arc::clone(backend);
        let trigger = self
            .lifecycle
            .trigger(move || async move { backend.run_query(&query).await });

        if trigger.is_started() {
            self.result = None;
            self.error = None;
        }
        trigger
    }

    /// Applies a finished run. Returns false if the run was superseded.
    pub fn complete(&mut self, completion: Completion<QueryResult>) -> bool {
        match self.lifecycle.settle(completion) {
            Settled::Succeeded(result) => {
                self.result = Some(result);
                self.error = None;
                true
            }
            Settled::Failed(message) => {
                self.error = Some(message);
                self.result = None;
                true
            }
            Settled::Stale => false,
        }
    }

    /// Empties the editor and the last outcome.
    ///
    /// A run still in flight is not cancelled; its completion is dropped.
    pub fn clear(&mut self) {
        self.editor.clear();
        self.result = None;
        self.error = None;
        self.lifecycle.invalidate();
    }

    /// Projects the last outcome for display.
    pub fn view(&self) -> ResultView {
        table::project(self.result.as_ref(), self.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::error::DeskError;
    use crate::session::lifecycle::Ticket;
    use pretty_assertions::assert_eq;

    fn backend() -> Arc<dyn Backend> {
        Arc::new(MockBackend::new())
    }

    fn completion(ticket: Ticket, outcome: crate::error::Result<QueryResult>) -> Completion<QueryResult> {
        Completion { ticket, outcome }
    }

    fn sample() -> QueryResult {
        QueryResult::with_data(
            vec!["Id".to_string(), "Name".to_string()],
            vec![vec!["1".to_string(), "NULL".to_string()]],
        )
    }

    #[test]
    fn test_new_session_has_placeholder_and_no_outcome() {
        let session = QuerySession::new("SELECT * FROM Artist LIMIT 10;");
        assert_eq!(session.query_text(), "SELECT * FROM Artist LIMIT 10;");
        assert!(session.result().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_run_blank_query_is_noop() {
        let mut session = QuerySession::new("   \n\t");
        assert!(!session.run(&backend()).is_started());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_run_success_sets_result_only() {
        let mut session = QuerySession::new("SELECT 1");
        let ticket = session.run(&backend()).into_pending().unwrap().ticket();
        assert!(session.is_running());

        assert!(session.complete(completion(ticket, Ok(sample()))));
        assert_eq!(session.result(), Some(&sample()));
        assert!(session.error().is_none());
        assert_eq!(session.phase(), Phase::Succeeded);
    }

    #[test]
    fn test_run_failure_sets_error_only() {
        let mut session = QuerySession::new("SELECT 1");
        let ticket = session.run(&backend()).into_pending().unwrap().ticket();

        session.complete(completion(ticket, Err(DeskError::backend("no such table: X"))));
        assert_eq!(session.error(), Some("no such table: X"));
        assert!(session.result().is_none());
        assert_eq!(session.phase(), Phase::Failed);
    }

    #[test]
    fn test_new_run_clears_previous_outcome() {
        let mut session = QuerySession::new("SELECT 1");
        let ticket = session.run(&backend()).into_pending().unwrap().ticket();
        session.complete(completion(ticket, Err(DeskError::backend("bad"))));

        let _pending = session.run(&backend());
        assert!(session.error().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_run_while_in_flight_keeps_state() {
        let mut session = QuerySession::new("SELECT 1");
        let _pending = session.run(&backend());

        assert!(!session.run(&backend()).is_started());
        assert_eq!(session.phase(), Phase::InFlight);
    }

    #[test]
    fn test_blank_run_after_failure_keeps_phase_and_error() {
        let mut session = QuerySession::new("SELECT 1");
        let ticket = session.run(&backend()).into_pending().unwrap().ticket();
        session.complete(completion(ticket, Err(DeskError::backend("bad"))));

        session.set_query_text("  ");
        assert!(!session.run(&backend()).is_started());
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.error(), Some("bad"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = QuerySession::new("SELECT 1");
        let ticket = session.run(&backend()).into_pending().unwrap().ticket();
        session.complete(completion(ticket, Ok(sample())));

        session.clear();
        assert_eq!(session.query_text(), "");
        assert!(session.result().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_completion_after_clear_is_dropped() {
        let mut session = QuerySession::new("SELECT 1");
        let ticket = session.run(&backend()).into_pending().unwrap().ticket();

        session.clear();
        assert!(!session.complete(completion(ticket, Ok(sample()))));
        assert!(session.result().is_none());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_indent_at_end() {
        let mut session = QuerySession::new("SELECT");
        session.editor_mut().set_caret(6);
        session.insert_indent();
        assert_eq!(session.query_text(), "SELECT  ");
        assert_eq!(session.caret(), 8);
    }

    #[test]
    fn test_indent_at_start() {
        let mut session = QuerySession::new("SELECT");
        session.editor_mut().set_caret(0);
        session.insert_indent();
        assert_eq!(session.query_text(), "  SELECT");
        assert_eq!(session.caret(), 2);
    }

    #[test]
    fn test_indent_mid_text_preserves_surroundings() {
        let mut session = QuerySession::new("SELECT *\nFROM t");
        session.editor_mut().set_caret(9);
        session.insert_indent();
        assert_eq!(session.query_text(), "SELECT *\n  FROM t");
        assert_eq!(session.caret(), 11);
    }

    #[test]
    fn test_line_numbers() {
        assert_eq!(QuerySession::new("").line_numbers(), 1..=1);
        assert_eq!(QuerySession::new("SELECT 1").line_numbers(), 1..=1);
        assert_eq!(
            QuerySession::new("SELECT *\nFROM t\nLIMIT 1").line_numbers(),
            1..=3
        );
    }

    #[tokio::test]
    async fn test_run_sends_trimmed_query() {
        let mock = Arc::new(MockBackend::new().with_query_result("select 42", sample()));
        let backend: Arc<dyn Backend> = mock.clone();
        let mut session = QuerySession::new("\n  SELECT 42  \n");

        let pending = session.run(&backend).into_pending().unwrap();
        session.complete(pending.resolve().await);

        assert_eq!(session.result(), Some(&sample()));
        assert_eq!(mock.query_calls(), 1);
    }
}
