//! Mock backend for testing and offline use.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::types::{AiResponse, QueryResult};
use super::Backend;
use crate::error::{DeskError, Result};

/// A canned reply for inputs containing a pattern.
#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(T),
    Err(String),
}

/// Mock backend that returns canned responses based on input patterns.
///
/// Patterns are matched case-insensitively as substrings, in the order they
/// were added; the built-in defaults apply when nothing matches.
#[derive(Debug, Default)]
pub struct MockBackend {
    query_replies: Vec<(String, Reply<QueryResult>)>,
    ai_replies: Vec<(String, Reply<String>)>,
    delay: Option<Duration>,
    query_calls: AtomicUsize,
    ai_calls: AtomicUsize,
}

impl MockBackend {
    /// Creates a mock backend with only the default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `result` for queries containing `pattern`.
    pub fn with_query_result(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.query_replies.push((pattern.into(), Reply::Ok(result)));
        self
    }

    /// Fails queries containing `pattern` with a backend error carrying `detail`.
    pub fn with_query_error(mut self, pattern: impl Into<String>, detail: impl Into<String>) -> Self {
        self.query_replies
            .push((pattern.into(), Reply::Err(detail.into())));
        self
    }

    /// Answers questions containing `pattern` with `answer`.
    pub fn with_answer(mut self, pattern: impl Into<String>, answer: impl Into<String>) -> Self {
        self.ai_replies
            .push((pattern.into(), Reply::Ok(answer.into())));
        self
    }

    /// Fails questions containing `pattern` with a backend error carrying `detail`.
    pub fn with_ai_error(mut self, pattern: impl Into<String>, detail: impl Into<String>) -> Self {
        self.ai_replies
            .push((pattern.into(), Reply::Err(detail.into())));
        self
    }

    /// Delays every response, so in-flight states can be observed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `run_query` calls received so far.
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of `ask_ai` calls received so far.
    pub fn ai_calls(&self) -> usize {
        self.ai_calls.load(Ordering::SeqCst)
    }

    fn find<'a, T>(replies: &'a [(String, Reply<T>)], input: &str) -> Option<&'a Reply<T>> {
        let input_lower = input.to_lowercase();
        replies
            .iter()
            .find(|(pattern, _)| input_lower.contains(&pattern.to_lowercase()))
            .map(|(_, reply)| reply)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn default_query(sql: &str) -> Result<QueryResult> {
        let upper = sql.to_uppercase();

        if upper.contains("WHERE 1 = 0") || upper.contains("WHERE 1=0") {
            return Ok(QueryResult::with_data(
                vec!["ArtistId".to_string(), "Name".to_string()],
                vec![],
            ));
        }

        if upper.starts_with("SELECT") || upper.starts_with("WITH") {
            return Ok(sample_artists());
        }

        let first_word = sql.split_whitespace().next().unwrap_or_default();
        Err(DeskError::backend(format!(
            "(sqlite3.OperationalError) near \"{first_word}\": syntax error"
        )))
    }

    fn default_answer(question: &str) -> String {
        let lower = question.to_lowercase();

        if lower.contains("artist") {
            return "Here are the **top 5 selling artists** by total sales:\n\n\
                    1. Iron Maiden - *$138.60*\n\
                    2. U2 - *$105.93*\n\
                    3. Metallica - *$90.09*\n\
                    4. Led Zeppelin - *$86.13*\n\
                    5. Lost - *$81.59*"
                .to_string();
        }

        if lower.contains("genre") {
            return "**Rock** has the most tracks, with *1297* tracks in total.".to_string();
        }

        "I couldn't find an answer to that question in the database.".to_string()
    }
}

fn sample_artists() -> QueryResult {
    let rows = [
        ("1", "AC/DC"),
        ("2", "Accept"),
        ("3", "Aerosmith"),
        ("4", "Alanis Morissette"),
        ("5", "NULL"),
    ];
    QueryResult::with_data(
        vec!["ArtistId".to_string(), "Name".to_string()],
        rows.iter()
            .map(|(id, name)| vec![id.to_string(), name.to_string()])
            .collect(),
    )
}

#[async_trait]
impl Backend for MockBackend {
    async fn run_query(&self, query: &str) -> Result<QueryResult> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        match Self::find(&self.query_replies, query) {
            Some(Reply::Ok(result)) => Ok(result.clone()),
            Some(Reply::Err(detail)) => Err(DeskError::backend(detail.clone())),
            None => Self::default_query(query),
        }
    }

    async fn ask_ai(&self, question: &str) -> Result<AiResponse> {
        self.ai_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        match Self::find(&self.ai_replies, question) {
            Some(Reply::Ok(answer)) => Ok(AiResponse {
                response: answer.clone(),
            }),
            Some(Reply::Err(detail)) => Err(DeskError::backend(detail.clone())),
            None => Ok(AiResponse {
                response: Self::default_answer(question),
            }),
        }
    }

    fn describe(&self) -> String {
        "mock backend".to_string()
    }
}
