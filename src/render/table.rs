//! Projection of a query outcome into an error, empty, or tabular view.

use crate::api::QueryResult;

/// Cell text the backend uses for SQL NULL.
pub const NULL_LITERAL: &str = "NULL";

/// Header of the leading row-number column.
pub const ORDINAL_HEADER: &str = "#";

/// A data cell; NULL is kept apart so it can be styled as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Value(String),
    Null,
}

impl Cell {
    fn from_text(text: &str) -> Self {
        if text == NULL_LITERAL {
            Self::Null
        } else {
            Self::Value(text.to_string())
        }
    }

    /// Text to lay out; NULL shows the literal marker.
    pub fn display(&self) -> &str {
        match self {
            Self::Value(v) => v,
            Self::Null => NULL_LITERAL,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One row with its 1-based ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub ordinal: String,
    pub cells: Vec<Cell>,
}

/// A fully materialized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// `#` followed by the result's column names.
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub row_count: usize,
    pub column_count: usize,
}

impl TableView {
    /// Number of columns excluding the ordinal column.
    pub fn data_columns(&self) -> usize {
        self.column_count
    }

    /// Summary line, e.g. `5 rows returned | 2 columns`.
    pub fn summary(&self) -> String {
        format!(
            "{} row{} returned | {} column{}",
            self.row_count,
            plural(self.row_count),
            self.column_count,
            plural(self.column_count)
        )
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// What the result area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    /// No run has completed yet.
    Nothing,
    /// The run failed; the message is shown verbatim.
    Error(String),
    /// The run succeeded without rows.
    Empty,
    Table(TableView),
}

impl ResultView {
    /// Message shown for a successful run without rows.
    pub const EMPTY_MESSAGE: &'static str = "Query executed successfully, no rows returned";

    /// Short tag used by headless state assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nothing => "none",
            Self::Error(_) => "error",
            Self::Empty => "empty",
            Self::Table(_) => "table",
        }
    }
}

/// Projects a session's `result`/`error` pair. An error always wins.
pub fn project(result: Option<&QueryResult>, error: Option<&str>) -> ResultView {
    if let Some(message) = error {
        return ResultView::Error(message.to_string());
    }
    let Some(result) = result else {
        return ResultView::Nothing;
    };
    if result.row_count == 0 {
        return ResultView::Empty;
    }

    let mut headers = Vec::with_capacity(result.columns.len() + 1);
    headers.push(ORDINAL_HEADER.to_string());
    headers.extend(result.columns.iter().cloned());

    let rows = result
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| TableRow {
            ordinal: (i + 1).to_string(),
            cells: row.iter().map(|c| Cell::from_text(c)).collect(),
        })
        .collect();

    ResultView::Table(TableView {
        headers,
        rows,
        row_count: result.row_count,
        column_count: result.columns.len(),
    })
}
