//! TUI application state and event loop.
//!
//! Three views share one [`AppState`]: live readings, the muscle-state
//! indicator, and the entropy collector. Timers and manual refreshes run on
//! the tokio runtime, so the draw loop never blocks on the network.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::runtime::Handle;

use myolink_core::{AppState, CollectionSnapshot, MuscleState, ReadingSnapshot, RefreshMode};

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Readings,
    State,
    Entropy,
}

impl View {
    pub const ALL: [View; 3] = [Self::Readings, Self::State, Self::Entropy];

    pub fn next(self) -> Self {
        match self {
            Self::Readings => Self::State,
            Self::State => Self::Entropy,
            Self::Entropy => Self::Readings,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Readings => "Readings",
            Self::State => "Muscle State",
            Self::Entropy => "Entropy",
        }
    }
}

/// Outcome of the last save, shown until the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMessage {
    Saved(String),
    Failed(String),
}

/// Everything one frame needs, copied out of the shared state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub readings: ReadingSnapshot,
    pub mode: RefreshMode,
    pub muscle: MuscleState,
    pub latest: f64,
    pub collection: CollectionSnapshot,
    pub display: Vec<f64>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: Arc<AppState>,
    rt: Handle,
    view: View,
    running: bool,
    save_message: Option<SaveMessage>,
}

impl App {
    pub fn new(state: Arc<AppState>, rt: Handle) -> Self {
        Self {
            state,
            rt,
            view: View::default(),
            running: true,
            save_message: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn device_url(&self) -> &str {
        self.state.config().base_url()
    }

    pub fn save_message(&self) -> Option<&SaveMessage> {
        self.save_message.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        let readings = self.state.readings();
        let latest = readings.history.latest().unwrap_or(0.0);
        Snapshot {
            mode: self.state.refresh_mode(),
            muscle: myolink_core::classify(latest),
            latest,
            readings,
            collection: self.state.collection(),
            display: self.state.display_buffer(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before printing a panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        self.state.shutdown();

        if let Some(SaveMessage::Saved(msg)) = &self.save_message {
            println!("{msg}");
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            let snap = self.snapshot();
            terminal.draw(|f| super::ui::draw(f, self, &snap))?;

            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        // Timers spawn onto the runtime, so key handlers run inside it.
        let _guard = self.rt.enter();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('1') => self.view = View::Readings,
            KeyCode::Char('2') => self.view = View::State,
            KeyCode::Char('3') => self.view = View::Entropy,
            _ => match self.view {
                View::Readings | View::State => self.handle_readings_key(key),
                View::Entropy => self.handle_entropy_key(key),
            },
        }
    }

    fn handle_readings_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') => {
                let state = Arc::clone(&self.state);
                self.rt.spawn(async move {
                    let _ = state.manual_refresh().await;
                });
            }
            KeyCode::Char('a') => {
                self.state.toggle_auto_refresh();
            }
            _ => {}
        }
    }

    /// Controls are gated like disabled buttons: start only when idle, stop
    /// only while collecting, save only with a non-empty log.
    fn handle_entropy_key(&mut self, key: KeyCode) {
        let snap = self.state.collection();
        match key {
            KeyCode::Char('s') if !snap.status.is_collecting() => {
                self.save_message = None;
                self.state.start_collection();
            }
            KeyCode::Char('x') if snap.status.is_collecting() => {
                self.state.stop_collection();
            }
            KeyCode::Char('w') if !snap.log.is_empty() => {
                self.save_message = Some(match self.state.save_session() {
                    Ok(report) => SaveMessage::Saved(report.to_string()),
                    Err(e) => {
                        log::error!("session export failed: {e}");
                        SaveMessage::Failed(format!("Save error: {e}"))
                    }
                });
            }
            _ => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
