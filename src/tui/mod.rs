//! Terminal User Interface for QueryDesk.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
pub mod keymap;
mod ui;
pub mod widgets;

pub use app::{App, AsyncMessage, Focus, Job, Tab};
pub use events::{Event, EventHandler};

use crate::api::Backend;
use crate::config::Config;
use crate::error::{DeskError, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Hands `job` to the runtime; its completion arrives on `tx`.
pub fn spawn_job(job: Job, tx: mpsc::Sender<AsyncMessage>) {
    tokio::spawn(async move {
        let message = job.resolve().await;
        if tx.send(message).await.is_err() {
            debug!("Dropping completion: event loop has exited");
        }
    });
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| DeskError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| DeskError::internal(format!("Failed to enter alternate screen: {e}")))?;

        Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| DeskError::internal(format!("Failed to create terminal: {e}")))
    }

    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| DeskError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| DeskError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| DeskError::internal(format!("Failed to show cursor: {e}")))
    }

    /// Runs the event loop until the user quits.
    pub async fn run(&mut self, mut app: App) -> Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let (tx, mut rx) = mpsc::channel::<AsyncMessage>(32);
        let result = self.run_event_loop(&mut app, tx, &mut rx).await;

        let _ = panic::take_hook();
        result
    }

    async fn run_event_loop(
        &mut self,
        app: &mut App,
        tx: mpsc::Sender<AsyncMessage>,
        rx: &mut mpsc::Receiver<AsyncMessage>,
    ) -> Result<()> {
        loop {
            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| DeskError::internal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            tokio::select! {
                event = self.event_handler.next() => match event {
                    Some(Event::Key(key)) => {
                        if let Some(job) = app.handle_key(key) {
                            spawn_job(job, tx.clone());
                        }
                    }
                    // Resize is handled by ratatui on the next draw; ticks
                    // only redraw so spinners animate.
                    Some(Event::Resize(_, _)) | Some(Event::Tick) => {}
                    None => {
                        return Err(DeskError::internal("Terminal event stream closed"));
                    }
                },

                Some(message) = rx.recv() => {
                    app.apply(message);
                }
            }
        }

        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the interactive TUI against `backend`.
pub async fn run(backend: Arc<dyn Backend>, config: &Config) -> Result<()> {
    info!("Starting TUI against {}", backend.describe());
    let app = App::new(backend, config);
    let mut tui = Tui::new()?;
    tui.run(app).await
}
