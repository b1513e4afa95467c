//! Draws a laid-out attachment bubble.

use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::layout::bubble::BubbleContents;
use crate::model::message::Direction;
use crate::tui::theme::Theme;

/// Render `contents` (already anchored to screen coordinates).
pub fn render(
    frame: &mut Frame,
    contents: &BubbleContents,
    direction: Direction,
    timestamp: &str,
    theme: &Theme,
) {
    if contents.frame.is_empty() {
        return;
    }

    let fill = match direction {
        Direction::Incoming => theme.incoming_bubble,
        Direction::Outgoing => theme.outgoing_bubble,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.bubble_border)
        .title_bottom(Span::styled(format!(" {timestamp} "), theme.timestamp))
        .style(fill);
    frame.render_widget(block, contents.frame);

    if !contents.icon.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(contents.icon_text.as_str(), theme.bubble_icon)),
            contents.icon,
        );
    }
    if !contents.filename.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(contents.filename_text.as_str(), fill)),
            contents.filename,
        );
    }
    if !contents.size_label.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(contents.size_text.as_str(), theme.bubble_size)),
            contents.size_label,
        );
    }
}
