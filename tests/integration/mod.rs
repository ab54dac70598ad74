//! Integration tests for QueryDesk.

pub mod http_backend_test;
pub mod session_flow_test;
