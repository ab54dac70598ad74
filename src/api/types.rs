//! Wire types for the query backend.
//!
//! Both endpoints take `{"query": ...}` and answer with either a JSON payload
//! or a non-success status whose body may carry a `detail` message.

use serde::{Deserialize, Deserializer, Serialize};

/// The two operations the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Execute raw SQL against the database.
    RunQuery,
    /// Ask a natural-language question.
    AskAi,
}

impl Endpoint {
    /// Path relative to the configured base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::RunQuery => "/run-query",
            Self::AskAi => "/ask-ai",
        }
    }

    /// Message used when a failed response carries no `detail`.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::RunQuery => "Failed to execute query",
            Self::AskAi => "Failed to get AI response",
        }
    }
}

/// Request body shared by both endpoints.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

/// Tabular result of a SQL statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order. Names are not required to be unique.
    pub columns: Vec<String>,

    /// Rows of cell text, one cell per column.
    #[serde(deserialize_with = "deserialize_rows")]
    pub rows: Vec<Vec<String>>,

    /// Number of rows in `rows`.
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a result from columns and rows, deriving `row_count`.
    pub fn with_data(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// Returns true if the statement produced no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Accepts scalar cells of any JSON type. Strings pass through, `null`
/// becomes `NULL`, everything else uses its JSON text.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<Vec<serde_json::Value>> = Vec::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect())
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

/// Answer to a natural-language question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    pub response: String,
}

/// Body of a failed response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Extracts the `detail` message from an error body, if there is one.
///
/// String details are returned as-is; structured details (such as a list of
/// validation errors) are returned as compact JSON.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
