//! Error types for QueryDesk.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for QueryDesk operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// The request never produced a response (connection refused, DNS, TLS, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    ///
    /// Carries the `detail` message from the response body when one was present.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A success response whose body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration errors (invalid config file, bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (terminal setup, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a backend error with the given message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport Error",
            Self::Backend(_) => "Backend Error",
            Self::Decode(_) => "Decode Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message suitable for showing to the user, without the
    /// category prefix. Empty when the failure carried no message.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Transport(msg)
            | Self::Backend(msg)
            | Self::Decode(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg.trim(),
        }
    }
}

/// Result type alias using DeskError.
pub type Result<T> = std::result::Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_transport() {
        let err = DeskError::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert_eq!(err.category(), "Transport Error");
    }

    #[test]
    fn test_error_display_backend() {
        let err = DeskError::backend("no such table: Artists");
        assert_eq!(err.to_string(), "Backend error: no such table: Artists");
        assert_eq!(err.category(), "Backend Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = DeskError::config("invalid base_url");
        assert_eq!(err.to_string(), "Configuration error: invalid base_url");
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_user_message_strips_category() {
        let err = DeskError::backend("no such column: nme");
        assert_eq!(err.user_message(), "no such column: nme");
    }

    #[test]
    fn test_user_message_empty_when_blank() {
        assert_eq!(DeskError::backend("   ").user_message(), "");
        assert_eq!(DeskError::decode("").user_message(), "");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeskError>();
    }
}
