//! Scrollable list of conversation rows.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::model::message::Direction;
use crate::tui::app::App;
use crate::tui::widgets::{attachment_bubble, expiration_timer};

/// Width of the selection marker column.
const MARKER_WIDTH: u16 = 2;

/// Render the visible rows. Rebinds cells when the viewport height changed.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    app.set_viewport_height(area.height);

    if app.message_count() == 0 {
        let empty = Paragraph::new(Span::styled("  No messages", app.theme.timestamp));
        frame.render_widget(empty, area);
        return;
    }

    for (idx, row) in app.row_areas(area) {
        if row.width <= MARKER_WIDTH {
            continue;
        }
        let cell_area = Rect::new(row.x + MARKER_WIDTH, row.y, row.width - MARKER_WIDTH, row.height);
        let Some(layout) = app.layout_cell(idx, cell_area) else {
            continue;
        };

        let theme = &app.theme;
        if idx == app.selected {
            let marker = Rect::new(row.x, row.y + row.height / 2, 1, 1);
            frame.render_widget(
                Paragraph::new(Span::styled("\u{25b8}", theme.selection_marker)),
                marker,
            );
        }

        let message = &app.messages[idx];
        let timestamp = message.timestamp.format(&app.date_format).to_string();
        let fill = match message.direction {
            Direction::Incoming => theme.incoming_bubble,
            Direction::Outgoing => theme.outgoing_bubble,
        };

        if let Some(bubble) = &layout.bubble {
            attachment_bubble::render(frame, bubble, message.direction, &timestamp, theme);
        }

        if let (Some(text), Some(body)) = (layout.text, message.body.as_deref()) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.bubble_border)
                .title_bottom(Span::styled(format!(" {timestamp} "), theme.timestamp))
                .style(fill);
            let paragraph = Paragraph::new(Line::from(format!(" {body}"))).block(block);
            frame.render_widget(paragraph, text);
        }

        if let (Some(caption), Some(body)) = (layout.caption, message.body.as_deref()) {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {body}"), theme.caption)),
                caption,
            );
        }

        if let (Some(timer), Some(controller)) = (
            layout.timer,
            app.cell_for(idx).and_then(|cell| cell.expiration()),
        ) {
            expiration_timer::render(frame, controller.view(), timer, theme);
        }
    }
}
