//! Countdown bar drawn beside disappearing messages.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::timer::expiration::ExpirationTimerView;
use crate::tui::theme::Theme;

const FILLED: &str = "\u{2588}";
const EMPTY: &str = "\u{2591}";

/// Render the bar inside `area`, leaving one blank cell on each side.
pub fn render(frame: &mut Frame, view: &ExpirationTimerView, area: Rect, theme: &Theme) {
    if !view.is_visible() || area.width < 3 {
        return;
    }
    let bar = Rect::new(area.x + 1, area.y, area.width - 2, area.height.min(1));
    frame.render_widget(Paragraph::new(bar_line(view, bar.width, theme)), bar);
}

fn bar_line(view: &ExpirationTimerView, width: u16, theme: &Theme) -> Line<'static> {
    let filled = view.filled_width(width);
    let empty = width - filled;
    Line::from(vec![
        Span::styled(FILLED.repeat(filled as usize), theme.timer_filled),
        Span::styled(EMPTY.repeat(empty as usize), theme.timer_empty),
    ])
}
