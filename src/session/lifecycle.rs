//! Request lifecycle controller.
//!
//! Drives one outstanding operation per session through
//! `Idle -> InFlight -> Succeeded | Failed`. The controller never runs the
//! operation itself: `trigger` hands back a [`PendingRequest`] for the event
//! loop to drive, and the finished [`Completion`] is fed back through
//! [`RequestLifecycle::settle`] on the same loop. Every accepted trigger is
//! tagged with the generation it was issued under; `invalidate` supersedes
//! it, and a completion from a superseded generation is reported as stale.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

use crate::error::Result;

/// Phase of the session's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight => "in_flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one accepted trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// An accepted operation that has not been driven yet.
pub struct PendingRequest<T> {
    ticket: Ticket,
    operation: BoxFuture<'static, Result<T>>,
}

impl<T> PendingRequest<T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Drives the operation to completion.
    pub async fn resolve(self) -> Completion<T> {
        Completion {
            ticket: self.ticket,
            outcome: self.operation.await,
        }
    }
}

impl<T> fmt::Debug for PendingRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// The finished outcome of a pending request.
#[derive(Debug)]
pub struct Completion<T> {
    pub ticket: Ticket,
    pub outcome: Result<T>,
}

/// Result of asking the controller to start an operation.
#[derive(Debug)]
pub enum Trigger<T> {
    /// Guard failed; nothing changed.
    Rejected,
    /// Operation accepted and now in flight.
    Started(PendingRequest<T>),
}

impl<T> Trigger<T> {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    /// Returns the pending request if the trigger was accepted.
    pub fn into_pending(self) -> Option<PendingRequest<T>> {
        match self {
            Self::Rejected => None,
            Self::Started(pending) => Some(pending),
        }
    }
}

/// What a completion means for the session once applied.
#[derive(Debug, PartialEq, Eq)]
pub enum Settled<T> {
    /// Deliver the value to the success reducer.
    Succeeded(T),
    /// Deliver the extracted message to the failure reducer.
    Failed(String),
    /// The completion belongs to a superseded generation; drop it.
    Stale,
}

/// Lifecycle state owned by exactly one session.
#[derive(Debug)]
pub struct RequestLifecycle {
    label: &'static str,
    fallback_message: &'static str,
    phase: Phase,
    last_error: Option<String>,
    generation: u64,
}

impl RequestLifecycle {
    /// Creates an idle controller.
    ///
    /// `label` names the session in logs; `fallback_message` is shown when a
    /// failure carries no message of its own.
    pub fn new(label: &'static str, fallback_message: &'static str) -> Self {
        Self {
            label,
            fallback_message,
            phase: Phase::Idle,
            last_error: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == Phase::InFlight
    }

    /// Message of the last failure, present only while `phase == Failed`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts `operation` unless one is already in flight.
    ///
    /// The operation is only invoked when the trigger is accepted.
    pub fn trigger<T, F, Fut>(&mut self, operation: F) -> Trigger<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if self.is_in_flight() {
            debug!("{}: trigger rejected, request already in flight", self.label);
            return Trigger::Rejected;
        }

        self.generation += 1;
        self.phase = Phase::InFlight;
        self.last_error = None;
        debug!("{}: request #{} in flight", self.label, self.generation);

        Trigger::Started(PendingRequest {
            ticket: Ticket {
                generation: self.generation,
            },
            operation: operation().boxed(),
        })
    }

    /// Applies a completion to the phase and reports what the session should do.
    pub fn settle<T>(&mut self, completion: Completion<T>) -> Settled<T> {
        if completion.ticket.generation != self.generation || !self.is_in_flight() {
            debug!(
                "{}: dropping stale completion #{} (current #{})",
                self.label, completion.ticket.generation, self.generation
            );
            return Settled::Stale;
        }

        match completion.outcome {
            Ok(value) => {
                self.phase = Phase::Succeeded;
                debug!("{}: request #{} succeeded", self.label, self.generation);
                Settled::Succeeded(value)
            }
            Err(e) => {
                let message = match e.user_message() {
                    "" => self.fallback_message.to_string(),
                    msg => msg.to_string(),
                };
                warn!("{}: request #{} failed: {}", self.label, self.generation, e);
                self.phase = Phase::Failed;
                self.last_error = Some(message.clone());
                Settled::Failed(message)
            }
        }
    }

    /// Supersedes the current generation and returns to `Idle`.
    ///
    /// A request still running keeps running, but its completion will settle
    /// as [`Settled::Stale`].
    pub fn invalidate(&mut self) {
        if self.is_in_flight() {
            debug!("{}: invalidating in-flight request #{}", self.label, self.generation);
        }
        self.generation += 1;
        self.phase = Phase::Idle;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use tokio_test::block_on;

    fn lifecycle() -> RequestLifecycle {
        RequestLifecycle::new("test", "Something went wrong")
    }

    #[test]
    fn test_starts_idle() {
        let lc = lifecycle();
        assert_eq!(lc.phase(), Phase::Idle);
        assert!(lc.last_error().is_none());
    }

    #[test]
    fn test_trigger_moves_to_in_flight() {
        let mut lc = lifecycle();
        let trigger = lc.trigger(|| async { Ok(1) });
        assert!(trigger.is_started());
        assert_eq!(lc.phase(), Phase::InFlight);
    }

    #[test]
    fn test_trigger_while_in_flight_is_rejected_without_invoking() {
        let mut lc = lifecycle();
        let _first = lc.trigger(|| async { Ok(1) });

        let mut invoked = false;
        let second = lc.trigger(|| {
            invoked = true;
            async { Ok(2) }
        });

        assert!(!second.is_started());
        assert!(!invoked);
        assert_eq!(lc.phase(), Phase::InFlight);
    }

    #[test]
    fn test_success_settles_with_value() {
        let mut lc = lifecycle();
        let pending = lc.trigger(|| async { Ok("rows") }).into_pending().unwrap();
        let completion = block_on(pending.resolve());

        assert_eq!(lc.settle(completion), Settled::Succeeded("rows"));
        assert_eq!(lc.phase(), Phase::Succeeded);
        assert!(lc.last_error().is_none());
    }

    #[test]
    fn test_failure_settles_with_message() {
        let mut lc = lifecycle();
        let pending = lc
            .trigger(|| async { Err::<(), _>(DeskError::backend("no such table: Foo")) })
            .into_pending()
            .unwrap();
        let completion = block_on(pending.resolve());

        assert_eq!(
            lc.settle(completion),
            Settled::Failed("no such table: Foo".to_string())
        );
        assert_eq!(lc.phase(), Phase::Failed);
        assert_eq!(lc.last_error(), Some("no such table: Foo"));
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let mut lc = lifecycle();
        let pending = lc
            .trigger(|| async { Err::<(), _>(DeskError::transport("")) })
            .into_pending()
            .unwrap();
        let completion = block_on(pending.resolve());

        assert_eq!(
            lc.settle(completion),
            Settled::Failed("Something went wrong".to_string())
        );
    }

    #[test]
    fn test_new_trigger_clears_last_error() {
        let mut lc = lifecycle();
        let pending = lc
            .trigger(|| async { Err::<(), _>(DeskError::backend("bad")) })
            .into_pending()
            .unwrap();
        lc.settle(block_on(pending.resolve()));
        assert!(lc.last_error().is_some());

        let _next = lc.trigger(|| async { Ok(()) });
        assert!(lc.last_error().is_none());
        assert_eq!(lc.phase(), Phase::InFlight);
    }

    #[test]
    fn test_invalidate_makes_completion_stale() {
        let mut lc = lifecycle();
        let pending = lc.trigger(|| async { Ok(1) }).into_pending().unwrap();

        lc.invalidate();
        assert_eq!(lc.phase(), Phase::Idle);

        let completion = block_on(pending.resolve());
        assert_eq!(lc.settle(completion), Settled::Stale);
        assert_eq!(lc.phase(), Phase::Idle);
    }

    #[test]
    fn test_stale_completion_does_not_disturb_newer_request() {
        let mut lc = lifecycle();
        let old = lc.trigger(|| async { Ok(1) }).into_pending().unwrap();
        lc.invalidate();
        let new = lc.trigger(|| async { Ok(2) }).into_pending().unwrap();

        assert_eq!(lc.settle(block_on(old.resolve())), Settled::Stale);
        assert_eq!(lc.phase(), Phase::InFlight);

        assert_eq!(lc.settle(block_on(new.resolve())), Settled::Succeeded(2));
    }

    #[test]
    fn test_tickets_are_distinct_per_trigger() {
        let mut lc = lifecycle();
        let first = lc.trigger(|| async { Ok(()) }).into_pending().unwrap();
        let first_ticket = first.ticket();
        lc.settle(block_on(first.resolve()));

        let second = lc.trigger(|| async { Ok(()) }).into_pending().unwrap();
        assert_ne!(first_ticket, second.ticket());
        assert!(second.ticket().generation() > first_ticket.generation());
    }
}
