//! QueryDesk - a terminal client for a SQL query and "Ask AI" service.
//!
//! This library exposes the core modules for use in integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod session;
pub mod tui;
