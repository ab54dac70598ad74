//! Event handling for the TUI.
//!
//! A dedicated thread polls crossterm and forwards events into a tokio
//! channel, so the async loop can `select!` over terminal input and
//! completed requests.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Application events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick (for spinner animation).
    Tick,
}

/// Handles terminal events.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default tick rate.
    pub fn new() -> Self {
        Self::with_tick_rate(Duration::from_millis(100))
    }

    /// Starts the polling thread with a custom tick rate.
    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        thread::spawn(move || poll_loop(tx, tick_rate));
        Self { rx, tick_rate }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Waits for the next event. `None` once the polling thread has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn poll_loop(tx: mpsc::UnboundedSender<Event>, tick_rate: Duration) {
    loop {
        let event = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                Ok(CrosstermEvent::Resize(width, height)) => Event::Resize(width, height),
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to read terminal event: {}", e);
                    return;
                }
            },
            Ok(false) => Event::Tick,
            Err(e) => {
                warn!("Failed to poll terminal events: {}", e);
                return;
            }
        };

        if tx.send(event).is_err() {
            // Receiver dropped: the UI has exited.
            return;
        }
    }
}
