//! Global application state for the TUI (the "Model" in Elm architecture).

use std::collections::HashSet;
use std::ops::Range;

use ratatui::layout::Rect;
use tracing::warn;

use crate::cell::{estimated_row_height, CellLayout, CellOptions, MessageCell};
use crate::model::message::ConversationMessage;
use crate::store::Conversation;
use crate::timer::clock::Clock;
use crate::timer::expiration::TickOutcome;
use crate::timer::scheduler::RunLoop;
use crate::tui::theme::Theme;

/// Blank rows between two messages.
pub const ROW_GAP: u16 = 1;

/// A pooled cell and the message it is bound to.
#[derive(Debug)]
struct PooledCell {
    cell: MessageCell,
    message: Option<usize>,
}

/// Complete TUI state.
pub struct App {
    // ── Data ──────────────────────────────────
    /// Conversation title shown in the header.
    pub title: String,
    /// All messages, oldest first.
    pub messages: Vec<ConversationMessage>,
    /// Estimated height of each message row, computed once.
    row_heights: Vec<u16>,
    /// Messages whose cell could not be configured; never retried.
    unbindable: HashSet<usize>,

    // ── Cells ─────────────────────────────────
    pool: Vec<PooledCell>,
    run_loop: RunLoop,
    clock: Box<dyn Clock>,
    options: CellOptions,

    // ── Navigation ────────────────────────────
    /// Index of the selected message.
    pub selected: usize,
    /// Index of the first message drawn at the top of the viewport.
    pub scroll_offset: usize,
    /// Height of the message area, set during render.
    pub viewport_height: u16,

    // ── UI state ──────────────────────────────
    pub show_help: bool,
    pub theme: Theme,
    /// `strftime` format for message timestamps.
    pub date_format: String,

    // ── Lifecycle ─────────────────────────────
    pub should_quit: bool,
    /// Transient status message and the instant it was set.
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create the app and bind cells to the first screen of messages.
    pub fn new(
        conversation: Conversation,
        options: CellOptions,
        clock: Box<dyn Clock>,
        theme: Theme,
        date_format: String,
    ) -> Self {
        let row_heights = conversation
            .messages
            .iter()
            .map(estimated_row_height)
            .collect();
        let last = conversation.messages.len().saturating_sub(1);

        let mut app = Self {
            title: conversation.title,
            messages: conversation.messages,
            row_heights,
            unbindable: HashSet::new(),
            pool: Vec::new(),
            run_loop: RunLoop::new(),
            clock,
            options,
            selected: last,
            scroll_offset: 0,
            viewport_height: 20,
            show_help: false,
            theme,
            date_format,
            should_quit: false,
            status_message: None,
        };

        // Conversations open at the newest message
        app.ensure_selected_visible();
        app.bind_visible_cells();
        app
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of countdowns currently ticking.
    pub fn active_timers(&self) -> usize {
        self.run_loop.active_count()
    }

    /// Number of cells allocated so far.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Time left until the earliest scheduled countdown tick.
    pub fn time_until_next_tick(&self) -> Option<std::time::Duration> {
        let wait = self.run_loop.next_deadline()? - self.clock.now_seconds();
        Some(std::time::Duration::from_secs_f64(wait.max(0.0)))
    }

    /// Messages that fit in the viewport starting at `scroll_offset`.
    ///
    /// Uses the estimated row heights only; no cell is laid out.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.scroll_offset.min(self.messages.len());
        let mut used: u16 = 0;
        let mut end = start;
        while end < self.messages.len() {
            let needed = self.row_heights[end].saturating_add(if end > start { ROW_GAP } else { 0 });
            if end > start && used.saturating_add(needed) > self.viewport_height {
                break;
            }
            used = used.saturating_add(needed);
            end += 1;
        }
        start..end
    }

    /// Rows to draw inside `area`, paired with their message index.
    pub fn row_areas(&self, area: Rect) -> Vec<(usize, Rect)> {
        let mut rows = Vec::new();
        let mut y = area.y;
        for idx in self.visible_range() {
            if y >= area.bottom() {
                break;
            }
            let height = self.row_heights[idx].min(area.bottom() - y);
            rows.push((idx, Rect::new(area.x, y, area.width, height)));
            y = y.saturating_add(height).saturating_add(ROW_GAP);
        }
        rows
    }

    /// Bind pooled cells to the visible messages, recycling the others.
    pub fn bind_visible_cells(&mut self) {
        let range = self.visible_range();
        let now = self.clock.now_seconds();

        for slot in self.pool.iter_mut() {
            if slot.message.is_some_and(|idx| !range.contains(&idx)) {
                slot.cell.prepare_for_reuse(&mut self.run_loop);
                slot.message = None;
            }
        }

        let mut failures = Vec::new();
        for idx in range {
            if self.unbindable.contains(&idx) || self.pool.iter().any(|s| s.message == Some(idx)) {
                continue;
            }
            let slot = match self.pool.iter().position(|s| s.message.is_none()) {
                Some(pos) => pos,
                None => {
                    self.pool.push(PooledCell {
                        cell: MessageCell::new(self.options),
                        message: None,
                    });
                    self.pool.len() - 1
                }
            };
            let pooled = &mut self.pool[slot];
            match pooled
                .cell
                .configure(&self.messages[idx], &mut self.run_loop, now)
            {
                Ok(()) => pooled.message = Some(idx),
                Err(e) => {
                    warn!(message_id = self.messages[idx].id, error = %e, "Failed to configure cell");
                    self.unbindable.insert(idx);
                    failures.push(e.to_string());
                }
            }
        }

        if let Some(first) = failures.first() {
            self.set_status(&format!("Cannot display message: {first}"));
        }
    }

    /// The cell currently bound to message `idx`.
    pub fn cell_for(&self, idx: usize) -> Option<&MessageCell> {
        self.pool
            .iter()
            .find(|s| s.message == Some(idx))
            .map(|s| &s.cell)
    }

    /// Lay out the cell bound to message `idx` inside `area`.
    pub fn layout_cell(&mut self, idx: usize, area: Rect) -> Option<CellLayout> {
        self.pool
            .iter_mut()
            .find(|s| s.message == Some(idx))
            .map(|s| s.cell.layout(area))
    }

    /// Select a message and scroll it into view.
    pub fn select_message(&mut self, index: usize) {
        if index >= self.messages.len() {
            return;
        }
        self.selected = index;
        self.ensure_selected_visible();
        self.bind_visible_cells();
    }

    /// Adjust `scroll_offset` so the selected message is inside the viewport.
    pub fn ensure_selected_visible(&mut self) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
            return;
        }
        while self.scroll_offset < self.selected && !self.visible_range().contains(&self.selected) {
            self.scroll_offset += 1;
        }
    }

    /// Record a new viewport height and rebind cells if it changed.
    pub fn set_viewport_height(&mut self, height: u16) {
        if height != self.viewport_height {
            self.viewport_height = height;
            self.ensure_selected_visible();
            self.bind_visible_cells();
        }
    }

    /// Stop the countdown of the selected message.
    pub fn stop_selected_timer(&mut self) {
        let selected = self.selected;
        let Some(slot) = self.pool.iter_mut().find(|s| s.message == Some(selected)) else {
            return;
        };
        if slot.cell.expiration().is_some_and(|c| c.is_running()) {
            slot.cell.stop_expiration_timer(&mut self.run_loop);
            self.set_status("Countdown stopped");
        } else {
            self.set_status("No running countdown on this message");
        }
    }

    /// Restart the countdown of the selected message from its expiration settings.
    pub fn restart_selected_timer(&mut self) {
        let selected = self.selected;
        let Some(spec) = self.messages.get(selected).and_then(|m| m.expiration) else {
            self.set_status("Message does not disappear");
            return;
        };
        let now = self.clock.now_seconds();
        if let Some(slot) = self.pool.iter_mut().find(|s| s.message == Some(selected)) {
            slot.cell.start_expiration_timer(
                &mut self.run_loop,
                spec.expires_at_seconds,
                spec.initial_duration_seconds,
                now,
            );
            self.set_status("Countdown restarted");
        }
    }

    /// Set a transient status message that auto-clears after a few seconds.
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some((msg.to_string(), std::time::Instant::now()));
    }

    /// Called every loop iteration: delivers due ticks and clears expired status messages.
    pub fn tick(&mut self) {
        let now = self.clock.now_seconds();
        let mut expired = Vec::new();

        for handle in self.run_loop.fire_due(now) {
            for slot in self.pool.iter_mut() {
                match slot.cell.handle_tick(&mut self.run_loop, handle, now) {
                    TickOutcome::Stale => continue,
                    TickOutcome::Updated(_) => {}
                    TickOutcome::Expired => expired.extend(slot.cell.message_id()),
                }
                break;
            }
        }

        for id in expired {
            self.set_status(&format!("Message {id} expired"));
        }

        if let Some((_, when)) = &self.status_message {
            if when.elapsed().as_secs() >= 5 {
                self.status_message = None;
            }
        }
    }

    /// Release every cell, cancelling all countdowns.
    pub fn shutdown(&mut self) {
        for slot in self.pool.iter_mut() {
            slot.cell.prepare_for_reuse(&mut self.run_loop);
            slot.message = None;
        }
    }
}
