//! Animated busy indicators.
//!
//! A spinner is created when a request is accepted and dropped when it
//! settles, so its age is the request's age.

use std::time::{Duration, Instant};

/// Braille frames for a running query.
const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Dot frames for a pending answer.
const DOT_FRAMES: &[&str] = &["", ".", "..", "..."];

const FRAME_DURATION_MS: u128 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStyle {
    Braille,
    Dots,
}

/// Spinner state for one in-flight request.
#[derive(Debug, Clone)]
pub struct Spinner {
    style: SpinnerStyle,
    started: Instant,
    label: &'static str,
}

impl Spinner {
    fn new(style: SpinnerStyle, label: &'static str) -> Self {
        Self {
            style,
            started: Instant::now(),
            label,
        }
    }

    /// Spinner for a running SQL query.
    pub fn executing() -> Self {
        Self::new(SpinnerStyle::Braille, "Running")
    }

    /// Spinner for a question waiting on the assistant.
    pub fn thinking() -> Self {
        Self::new(SpinnerStyle::Dots, "Thinking")
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Current animation frame.
    pub fn frame(&self) -> &'static str {
        let index = (self.elapsed().as_millis() / FRAME_DURATION_MS) as usize;
        match self.style {
            SpinnerStyle::Braille => BRAILLE_FRAMES[index % BRAILLE_FRAMES.len()],
            SpinnerStyle::Dots => DOT_FRAMES[index % DOT_FRAMES.len()],
        }
    }

    /// Label with its animation, e.g. `⠙ Running` or `Thinking..`.
    pub fn display(&self) -> String {
        match self.style {
            SpinnerStyle::Braille => format!("{} {}", self.frame(), self.label),
            SpinnerStyle::Dots => format!("{}{}", self.label, self.frame()),
        }
    }
}
