//! TUI widgets for QueryDesk.

pub mod chat;
pub mod header;
pub mod input;
pub mod spinner;
pub mod table;
