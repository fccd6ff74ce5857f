//! UI rendering module for Noor Al-Huda
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod prayer_card;

pub use help_overlay::render as render_help_overlay;
pub use prayer_card::render as render_prayer_card;

use ratatui::Frame;

use crate::app::App;

/// Renders the dashboard and, when requested, the help overlay above it
pub fn render(frame: &mut Frame, app: &App) {
    render_prayer_card(frame, app);
    if app.show_help {
        render_help_overlay(frame);
    }
}
