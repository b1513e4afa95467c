//! Color theme definitions for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// A complete color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header_bar: Style,
    pub status_bar: Style,
    pub selection_marker: Style,
    pub incoming_bubble: Style,
    pub outgoing_bubble: Style,
    pub bubble_border: Style,
    pub bubble_icon: Style,
    pub bubble_size: Style,
    pub caption: Style,
    pub timestamp: Style,
    pub timer_filled: Style,
    pub timer_empty: Style,
    pub popup: Style,
    pub popup_title: Style,
    pub key_hint: Style,
}

impl Theme {
    /// Dark theme (default).
    pub fn dark() -> Self {
        Self {
            header_bar: Style::default()
                .fg(Color::Rgb(200, 200, 220))
                .bg(Color::Rgb(30, 30, 46)),
            status_bar: Style::default()
                .fg(Color::Rgb(150, 150, 170))
                .bg(Color::Rgb(30, 30, 46)),
            selection_marker: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            incoming_bubble: Style::default()
                .fg(Color::Rgb(220, 220, 230))
                .bg(Color::Rgb(40, 40, 60)),
            outgoing_bubble: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(30, 70, 110)),
            bubble_border: Style::default().fg(Color::Rgb(80, 80, 100)),
            bubble_icon: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            bubble_size: Style::default().fg(Color::Rgb(150, 150, 170)),
            caption: Style::default().fg(Color::Rgb(200, 200, 220)),
            timestamp: Style::default().fg(Color::Rgb(110, 110, 130)),
            timer_filled: Style::default().fg(Color::Rgb(255, 170, 60)),
            timer_empty: Style::default().fg(Color::Rgb(70, 70, 90)),
            popup: Style::default()
                .fg(Color::Rgb(220, 220, 230))
                .bg(Color::Rgb(20, 20, 35)),
            popup_title: Style::default()
                .fg(Color::Rgb(130, 170, 255))
                .add_modifier(Modifier::BOLD),
            key_hint: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light theme for bright terminals.
    pub fn light() -> Self {
        Self {
            header_bar: Style::default()
                .fg(Color::Rgb(30, 30, 46))
                .bg(Color::Rgb(220, 220, 230)),
            status_bar: Style::default()
                .fg(Color::Rgb(60, 60, 80))
                .bg(Color::Rgb(220, 220, 230)),
            selection_marker: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            incoming_bubble: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(235, 235, 240)),
            outgoing_bubble: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(200, 225, 250)),
            bubble_border: Style::default().fg(Color::Rgb(160, 160, 180)),
            bubble_icon: Style::default()
                .fg(Color::Rgb(0, 120, 60))
                .add_modifier(Modifier::BOLD),
            bubble_size: Style::default().fg(Color::Rgb(90, 90, 110)),
            caption: Style::default().fg(Color::Rgb(40, 40, 60)),
            timestamp: Style::default().fg(Color::Rgb(120, 120, 140)),
            timer_filled: Style::default().fg(Color::Rgb(200, 100, 0)),
            timer_empty: Style::default().fg(Color::Rgb(190, 190, 200)),
            popup: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(245, 245, 250)),
            popup_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            key_hint: Style::default()
                .fg(Color::Rgb(150, 90, 0))
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Theme by config name. Unknown names fall back to dark.
    pub fn by_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "Unknown theme, using dark");
                Self::dark()
            }
        }
    }
}
