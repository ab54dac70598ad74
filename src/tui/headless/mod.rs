//! Headless mode for scripted testing and automation.
//!
//! Runs the same [`App`] the terminal UI runs, against ratatui's
//! `TestBackend`, feeding it scripted events and capturing the screen.
//! Requests go through the real backend and complete on the runtime; the
//! runner applies completions between events, and `wait:idle` blocks until
//! nothing is in flight.

mod events;
mod output;

pub use events::{parse_size, Assertion, Event, EventParser};
pub use output::{HeadlessOutput, OutputFormat, ScreenRenderer};

use crate::api::Backend;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::tui::app::{App, AsyncMessage};
use crate::tui::keymap::Command;
use crate::tui::{spawn_job, ui};
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Longest `wait:idle` may block before the run is aborted.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub width: u16,
    pub height: u16,
    pub output_format: OutputFormat,
    /// Stop at the first failed assertion.
    pub fail_fast: bool,
    /// Path to write output (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            output_format: OutputFormat::Text,
            fail_fast: false,
            output_file: None,
        }
    }
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size()?;
        Ok(Self {
            width,
            height,
            output_format: cli.parse_output_format()?,
            fail_fast: cli.fail_fast,
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    pub screen_lines: Vec<String>,
    pub events_executed: usize,
    pub duration: Duration,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    /// Descriptions of the assertions that failed, in order.
    pub failures: Vec<String>,
    pub state: HeadlessState,
    /// Frame captures (frames output mode only).
    pub frames: Vec<Frame>,
}

/// Snapshot of application state for JSON output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeadlessState {
    pub tab: String,
    pub focus: String,
    pub running: bool,
    pub query_text: String,
    pub query_phase: String,
    /// Which result view is shown: none, error, empty or table.
    pub result: String,
    pub row_count: usize,
    pub error: Option<String>,
    pub chat_phase: String,
    pub draft_text: String,
    pub message_count: usize,
}

impl HeadlessState {
    fn from_app(app: &App) -> Self {
        Self {
            tab: format!("{:?}", app.tab),
            focus: format!("{:?}", app.focus),
            running: app.running,
            query_text: app.query.query_text().to_string(),
            query_phase: app.query.phase().to_string(),
            result: app.query.view().kind().to_string(),
            row_count: app.query.result().map_or(0, |r| r.row_count),
            error: app.query.error().map(String::from),
            chat_phase: app.conversation.phase().to_string(),
            draft_text: app.conversation.draft().text().to_string(),
            message_count: app.conversation.transcript().len(),
        }
    }
}

/// A captured frame (screen state after an event).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number (0 = initial state).
    pub number: usize,
    /// Event that produced this frame (None for initial).
    pub event: Option<String>,
    pub screen: String,
}

/// Runs the TUI in headless mode.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    terminal: Terminal<TestBackend>,
    app: App,
    tx: mpsc::Sender<AsyncMessage>,
    rx: mpsc::Receiver<AsyncMessage>,
    events: Vec<Event>,
    frames: Vec<Frame>,
    failures: Vec<String>,
    assertions_passed: usize,
}

impl HeadlessRunner {
    /// Creates a runner whose app talks to `backend`.
    pub fn new(config: HeadlessConfig, backend: Arc<dyn Backend>, app_config: &Config) -> Result<Self> {
        let terminal = Terminal::new(TestBackend::new(config.width, config.height))
            .map_err(|e| DeskError::internal(format!("Failed to create test terminal: {e}")))?;
        let (tx, rx) = mpsc::channel(32);

        Ok(Self {
            config,
            terminal,
            app: App::new(backend, app_config),
            tx,
            rx,
            events: Vec::new(),
            frames: Vec::new(),
            failures: Vec::new(),
            assertions_passed: 0,
        })
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = EventParser::new().parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file, or stdin when `path` is `-`.
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            std::io::read_to_string(std::io::stdin())
                .map_err(|e| DeskError::internal(format!("Failed to read stdin: {e}")))?
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| DeskError::config(format!("Failed to read script file {path}: {e}")))?
        };
        self.load_events(&content)
    }

    /// Runs the loaded events and returns the result.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        let start = Instant::now();
        self.capture_frame(None)?;

        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;

        for event in events {
            let description = event.to_string();
            let stop = self.step(event).await?;
            events_executed += 1;

            self.drain_completions();
            self.draw()?;
            if self.config.output_format == OutputFormat::Frames {
                self.capture_frame(Some(description))?;
            }

            if stop || !self.app.running {
                break;
            }
        }

        self.draw()?;
        let screen = self.render_screen();
        let screen_lines = screen.lines().map(String::from).collect();

        Ok(HeadlessResult {
            screen,
            screen_lines,
            events_executed,
            duration: start.elapsed(),
            assertions_passed: self.assertions_passed,
            assertions_failed: self.failures.len(),
            failures: self.failures,
            state: HeadlessState::from_app(&self.app),
            frames: self.frames,
        })
    }

    /// Executes one event. Returns true when the run should stop.
    async fn step(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => {
                if let Some(job) = self.app.handle_key(key) {
                    spawn_job(job, self.tx.clone());
                }
            }
            Event::Type(text) => {
                for c in text.chars() {
                    let command = if c == '\n' {
                        Command::Newline
                    } else {
                        Command::Insert(c)
                    };
                    self.app.dispatch(command);
                }
            }
            Event::Wait(duration) => tokio::time::sleep(duration).await,
            Event::WaitIdle => self.wait_idle().await?,
            Event::Resize(w, h) => {
                self.terminal
                    .resize(Rect::new(0, 0, w, h))
                    .map_err(|e| DeskError::internal(format!("Resize failed: {e}")))?;
            }
            Event::Snapshot(name) => {
                self.draw()?;
                self.capture_frame(Some(format!("snapshot:{name}")))?;
            }
            Event::Assert(assertion) => {
                self.drain_completions();
                self.draw()?;
                let screen = self.render_screen();
                if assertion.check(&screen, &self.app) {
                    self.assertions_passed += 1;
                } else {
                    warn!("Assertion failed: {}", assertion);
                    self.failures.push(assertion.to_string());
                    return Ok(self.config.fail_fast);
                }
            }
        }
        Ok(false)
    }

    /// Applies every completion that has already arrived.
    fn drain_completions(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.app.apply(message);
        }
    }

    /// Blocks until neither session has a request in flight.
    async fn wait_idle(&mut self) -> Result<()> {
        let app = &mut self.app;
        let rx = &mut self.rx;

        let settled = tokio::time::timeout(IDLE_TIMEOUT, async move {
            while app.is_busy() {
                match rx.recv().await {
                    Some(message) => app.apply(message),
                    None => break,
                }
            }
        })
        .await;

        match settled {
            Ok(()) => {
                debug!("Headless runner idle");
                Ok(())
            }
            Err(_) => Err(DeskError::internal(format!(
                "wait:idle timed out after {}s",
                IDLE_TIMEOUT.as_secs()
            ))),
        }
    }

    fn draw(&mut self) -> Result<()> {
        let app = &mut self.app;
        self.terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| DeskError::internal(format!("Failed to render: {e}")))?;
        Ok(())
    }

    fn render_screen(&self) -> String {
        ScreenRenderer::render(self.terminal.backend().buffer())
    }

    fn capture_frame(&mut self, event: Option<String>) -> Result<()> {
        self.draw()?;
        let screen = self.render_screen();
        self.frames.push(Frame {
            number: self.frames.len(),
            event,
            screen,
        });
        Ok(())
    }
}

/// Runs headless mode from CLI arguments and returns the process exit code.
pub async fn run_headless(cli: &Cli, backend: Arc<dyn Backend>, app_config: &Config) -> Result<i32> {
    cli.validate_headless()?;

    let config = HeadlessConfig::from_cli(cli)?;
    let mut runner = HeadlessRunner::new(config.clone(), backend, app_config)?;

    if let Some(ref events) = cli.events {
        runner.load_events(events)?;
    } else if let Some(ref script) = cli.script {
        runner.load_script(script)?;
    }

    let result = runner.run().await?;
    let rendered = HeadlessOutput::new(config.output_format).format(&result);

    if let Some(ref path) = config.output_file {
        std::fs::write(path, &rendered)
            .map_err(|e| DeskError::internal(format!("Failed to write output file: {e}")))?;
    } else {
        print!("{rendered}");
    }

    Ok(if result.assertions_failed > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use pretty_assertions::assert_eq;

    async fn run_script(script: &str) -> HeadlessResult {
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
        let config = HeadlessConfig {
            width: 100,
            height: 30,
            ..Default::default()
        };
        let mut runner = HeadlessRunner::new(config, backend, &Config::default()).unwrap();
        runner.load_events(script).unwrap();
        runner.run().await.unwrap()
    }

    #[tokio::test]
    async fn test_initial_screen_shows_tabs() {
        let result = run_script("assert:contains:SQL Query,assert:contains:Ask AI").await;
        assert_eq!(result.assertions_passed, 2);
        assert_eq!(result.assertions_failed, 0);
    }

    #[tokio::test]
    async fn test_run_query_and_wait_idle() {
        let result = run_script(
            "key:ctrl+l,type:SELECT * FROM Artist,key:ctrl+r,wait:idle,\
             assert:state:query_phase=succeeded,assert:contains:5 rows returned",
        )
        .await;
        assert_eq!(result.failures, Vec::<String>::new());
        assert_eq!(result.state.row_count, 5);
        assert_eq!(result.state.result, "table");
    }

    #[tokio::test]
    async fn test_failed_query_shows_error() {
        let result = run_script(
            "key:ctrl+l,type:SELEC nothing,key:f5,wait:idle,\
             assert:state:result=error,assert:contains:syntax error",
        )
        .await;
        assert_eq!(result.assertions_failed, 0);
        assert!(result.state.error.is_some());
    }

    #[tokio::test]
    async fn test_ask_ai_turn() {
        let result = run_script(
            "key:f2,type:Which genre has the most tracks?,key:enter,wait:idle,\
             assert:state:message_count=2,assert:contains:Rock",
        )
        .await;
        assert_eq!(result.failures, Vec::<String>::new());
        assert_eq!(result.state.chat_phase, "succeeded");
    }

    #[tokio::test]
    async fn test_failed_assertion_is_recorded() {
        let result = run_script("assert:contains:not on screen,assert:state:tab=Sql").await;
        assert_eq!(result.assertions_passed, 1);
        assert_eq!(result.failures, vec!["contains:not on screen".to_string()]);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_failure() {
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
        let config = HeadlessConfig {
            fail_fast: true,
            ..Default::default()
        };
        let mut runner = HeadlessRunner::new(config, backend, &Config::default()).unwrap();
        runner
            .load_events("assert:contains:missing,assert:contains:SQL Query")
            .unwrap();
        let result = runner.run().await.unwrap();

        assert_eq!(result.events_executed, 1);
        assert_eq!(result.assertions_passed, 0);
    }

    #[tokio::test]
    async fn test_quit_stops_run() {
        let result = run_script("key:ctrl+q,assert:contains:anything").await;
        assert!(!result.state.running);
        assert_eq!(result.events_executed, 1);
    }

    #[tokio::test]
    async fn test_frames_are_captured() {
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
        let config = HeadlessConfig {
            output_format: OutputFormat::Frames,
            ..Default::default()
        };
        let mut runner = HeadlessRunner::new(config, backend, &Config::default()).unwrap();
        runner.load_events("key:f2,key:f1").unwrap();
        let result = runner.run().await.unwrap();

        assert_eq!(result.frames.len(), 3);
        assert_eq!(result.frames[1].event.as_deref(), Some("key:f2"));
    }
}
