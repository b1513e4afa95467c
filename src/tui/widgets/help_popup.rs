//! Help popup listing keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::app::App;
use crate::tui::theme::Theme;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const KEY_WIDTH: usize = 10;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j / k", "Next / previous message"),
            ("g / G", "First / last message"),
            ("PgDn/Up", "Scroll one screen"),
        ],
    ),
    (
        "Disappearing messages",
        &[
            ("s", "Stop the selected countdown"),
            ("r", "Restart the selected countdown"),
        ],
    ),
    (
        "General",
        &[
            ("?", "Toggle this help"),
            ("q / Esc", "Quit"),
            ("Ctrl-C", "Force quit"),
        ],
    ),
];

/// Render the help popup centered on screen.
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let screen = frame.area();

    let popup_width = 56.min(screen.width.saturating_sub(4));
    let lines = build_lines(theme, popup_width.saturating_sub(2) as usize);
    let popup_height = (lines.len() as u16 + 2).min(screen.height.saturating_sub(2));

    let area = centered_rect_exact(popup_width, popup_height, screen);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_title)
        .title(" Help ")
        .style(theme.popup);

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn build_lines(theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("  chatcell", theme.popup_title),
            Span::styled(format!("  v{VERSION}"), theme.timestamp),
        ]),
        Line::from(""),
    ];

    for (title, shortcuts) in SECTIONS {
        let sep = "\u{2500}".repeat(width.saturating_sub(title.len() + 4));
        lines.push(Line::from(vec![
            Span::styled(format!("  {title} "), theme.popup_title),
            Span::styled(sep, theme.timestamp),
        ]));
        for (key, desc) in *shortcuts {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:>KEY_WIDTH$}"), theme.key_hint),
                Span::styled(format!("  {desc}"), theme.popup),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines
}

/// Calculate a centered rectangle with exact dimensions, clamped to screen.
pub(crate) fn centered_rect_exact(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
