//! Session state for the two tabs.
//!
//! Each session owns its own [`RequestLifecycle`]; nothing here runs I/O.
//! Triggers hand back a [`PendingRequest`] that the caller drives and feeds
//! back through the session's `complete`.

pub mod buffer;
pub mod conversation;
pub mod lifecycle;
pub mod query;

pub use buffer::TextBuffer;
pub use conversation::{ConversationSession, Message, Role};
pub use lifecycle::{Completion, PendingRequest, Phase, RequestLifecycle, Settled, Ticket, Trigger};
pub use query::QuerySession;
