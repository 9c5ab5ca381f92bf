//! Main TUI application state machine.
//!
//! Handles:
//! - Focus between the disease selector and the form
//! - Input event handling
//! - Synchronous prediction on submit

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::application::{FormPhase, ModelPaths, ModelRegistry, PredictionDispatcher, PredictionForm};
use crate::config::AppConfig;
use crate::domain::DiseaseCategory;

use super::ui::{
    form::render_form, render_disclaimer, selector::render_selector, verdict::render_verdict,
};

/// Which part of the page receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Selector,
    Form,
}

/// Main application state
pub struct App {
    /// Whether the app should quit
    should_quit: bool,

    focus: Focus,

    /// Selector cursor row
    highlighted: usize,

    /// Session-scoped input state
    form: PredictionForm,

    /// Shared, read-only model registry behind the dispatcher
    dispatcher: PredictionDispatcher,
}

impl App {
    /// Load every model and build the application.
    ///
    /// # Errors
    /// Returns error if the model directory is missing or any model fails to
    /// load or verify.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let model_dir = &config.model_dir;
        if !model_dir.is_dir() {
            return Err(anyhow!(
                "Model directory not found at {:?}. Set PROGNOS_MODEL_PATH to a directory containing the model files.",
                model_dir
            ));
        }

        let trust = config.model_trust()?;
        let registry = ModelRegistry::load(&ModelPaths::in_dir(model_dir), &trust)
            .map_err(|e| anyhow!("Failed to load models from {:?}: {}", model_dir, e))?;
        tracing::info!("Model registry ready: {:?}", registry);

        Ok(Self::with_dependencies(Arc::new(registry)))
    }

    /// Create application with an injected registry (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(registry: Arc<ModelRegistry>) -> Self {
        let initial = DiseaseCategory::ALL[0];
        Self {
            should_quit: false,
            focus: Focus::Selector,
            highlighted: initial.index(),
            form: PredictionForm::new(initial),
            dispatcher: PredictionDispatcher::new(registry),
        }
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub fn form(&self) -> &PredictionForm {
        &self.form
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the whole page into `f`.
    pub fn draw(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(rows[0]);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(columns[1]);

        render_selector(
            f,
            columns[0],
            self.form.category(),
            self.highlighted,
            self.focus == Focus::Selector,
        );
        render_form(f, main[0], &self.form, self.focus == Focus::Form);
        render_verdict(f, main[1], self.form.phase());
        render_disclaimer(f, rows[1]);
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if matches!(key, KeyCode::Tab | KeyCode::BackTab) {
            self.focus = match self.focus {
                Focus::Selector => Focus::Form,
                Focus::Form => Focus::Selector,
            };
            return;
        }

        match self.focus {
            Focus::Selector => self.handle_selector_key(key),
            Focus::Form => self.handle_form_key(key),
        }
    }

    fn handle_selector_key(&mut self, key: KeyCode) {
        let count = DiseaseCategory::COUNT;
        match key {
            KeyCode::Up => {
                self.highlighted = (self.highlighted + count - 1) % count;
            }
            KeyCode::Down => {
                self.highlighted = (self.highlighted + 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right => {
                let category = DiseaseCategory::ALL[self.highlighted];
                self.form.select_category(category);
                self.focus = Focus::Form;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.highlighted = self.form.category().index();
                self.focus = Focus::Selector;
            }
            KeyCode::Up => {
                self.form.prev_field();
            }
            KeyCode::Down => {
                self.form.next_field();
            }
            KeyCode::Left => self.step(-1.0),
            KeyCode::Right => self.step(1.0),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form.load_sample();
            }
            KeyCode::Char(c) => {
                self.form.input_char(c);
            }
            KeyCode::Backspace => {
                self.form.delete_char();
            }
            KeyCode::Delete => {
                self.form.clear_field();
            }
            KeyCode::Enter => {
                self.submit();
            }
            _ => {}
        }
    }

    fn step(&mut self, delta: f64) {
        if let Err(e) = self.form.step(delta) {
            self.form.record_failure(e.to_string());
        }
    }

    fn submit(&mut self) {
        let category = self.form.category();
        if let FormPhase::Failed(message) = self.form.submit(&self.dispatcher) {
            tracing::warn!("{} submit failed: {}", category, message);
        }
    }
}
