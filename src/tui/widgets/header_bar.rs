//! Top header bar showing the conversation title and countdown count.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::tui::app::App;

/// Render the top header bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let total = app.message_count();
    let mut spans = vec![
        Span::styled(format!(" {}", app.title), theme.header_bar),
        Span::styled(format!(" | {total} messages"), theme.header_bar),
    ];

    let timers = app.active_timers();
    if timers > 0 {
        spans.push(Span::styled(
            format!(" | {timers} disappearing"),
            theme.header_bar,
        ));
    }

    // Right-aligned help hint
    let left_len: usize = spans.iter().map(|s| s.content.width()).sum();
    let right_text = " [?] Help ";
    let width = area.width as usize;
    if width > left_len + right_text.len() {
        let padding = width - left_len - right_text.len();
        spans.push(Span::styled(" ".repeat(padding), theme.header_bar));
    }
    spans.push(Span::styled(right_text, theme.header_bar));

    let bar = Paragraph::new(Line::from(spans)).style(theme.header_bar);
    frame.render_widget(bar, area);
}
