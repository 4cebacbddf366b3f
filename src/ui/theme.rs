//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    pub const SELECTED_BG: Color = Color::DarkGray;

    // ── tree pane ──────────────────────────────────────────────
    pub fn line_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Self::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    /// Key names in the status bar hints.
    pub fn hint_key_style() -> Style {
        Self::status_bar_style()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }
}
