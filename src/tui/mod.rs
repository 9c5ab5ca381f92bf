//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single page:
//! - Disease selector sidebar
//! - Input form for the selected disease
//! - Verdict panel for the last submit

mod app;
mod styles;
mod ui;

pub use app::{App, Focus};
pub use styles::MedicalTheme;
