//! Pure projections from session state to display structures.
//!
//! Nothing here touches the terminal; the widgets in `tui::widgets` turn
//! these structures into styled ratatui lines.

pub mod inline;
pub mod table;

pub use inline::{classify_line, render_message, tokenize_inline, Fragment, LineShape, RenderedLine};
pub use table::{project, Cell, ResultView, TableRow, TableView, NULL_LITERAL};
