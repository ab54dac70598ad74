//! Backend boundary for QueryDesk.
//!
//! The backend executes SQL and translates natural-language questions into
//! SQL; this module only defines how the client talks to it.

mod http;
mod mock;
mod types;

pub use http::HttpBackend;
pub use mock::MockBackend;
pub use types::{extract_detail, AiResponse, Endpoint, QueryRequest, QueryResult};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the two operations the client depends on.
///
/// Failures carry a human-readable message in the returned `DeskError`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Executes a SQL statement and returns its rows.
    async fn run_query(&self, query: &str) -> Result<QueryResult>;

    /// Asks a natural-language question and returns the prose answer.
    async fn ask_ai(&self, question: &str) -> Result<AiResponse>;

    /// Short description for the header bar (e.g. the base URL).
    fn describe(&self) -> String;
}
