//! A conversation row: message bubble plus optional disappearing-message timer.
//!
//! Cells are recycled as the list scrolls. Reconfiguring a cell always
//! stops the countdown of the message it showed before, so a tick of the
//! old countdown can never reach the visual of the new message.

use std::time::Duration;

use ratatui::layout::{Rect, Size};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::error::Result;
use crate::layout::bubble::{
    bubble_height, AttachmentBubbleLayout, BubbleContents, DEFAULT_MAX_BUBBLE_WIDTH,
};
use crate::model::message::{ConversationMessage, Direction, MessageId};
use crate::timer::expiration::{ExpirationTimerController, TickOutcome, DEFAULT_TICK_INTERVAL};
use crate::timer::scheduler::{Scheduler, TickHandle};

/// Width of the countdown column next to a disappearing message.
pub const EXPIRATION_TIMER_WIDTH: u16 = 10;

/// Height of a text-only row: two borders around one line.
pub const TEXT_ROW_HEIGHT: u16 = 3;

/// Height of the caption line under an attachment bubble.
const CAPTION_HEIGHT: u16 = 1;

/// Border plus padding on each side of a text bubble.
const TEXT_CHROME: u16 = 4;

/// Row height for `message`, without laying anything out.
pub fn estimated_row_height(message: &ConversationMessage) -> u16 {
    match &message.attachment {
        Some(_) if has_text(message.body.as_deref()) => bubble_height() + CAPTION_HEIGHT,
        Some(_) => bubble_height(),
        None => TEXT_ROW_HEIGHT,
    }
}

fn has_text(body: Option<&str>) -> bool {
    body.is_some_and(|b| !b.trim().is_empty())
}

/// Tunables shared by every cell of a list.
#[derive(Debug, Clone, Copy)]
pub struct CellOptions {
    pub tick_interval: Duration,
    pub max_bubble_width: u16,
    pub timer_column: bool,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_bubble_width: DEFAULT_MAX_BUBBLE_WIDTH,
            timer_column: true,
        }
    }
}

impl CellOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.timer.tick_interval(),
            max_bubble_width: config.layout.max_bubble_width,
            timer_column: config.layout.timer_column,
        }
    }
}

/// Absolute frames of one laid-out row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellLayout {
    /// Attachment bubble, when the message carries one.
    pub bubble: Option<BubbleContents>,
    /// Text bubble frame for messages without an attachment.
    pub text: Option<Rect>,
    /// Caption line under an attachment bubble.
    pub caption: Option<Rect>,
    /// Countdown bar, while one is displayed.
    pub timer: Option<Rect>,
}

/// One reusable conversation row.
#[derive(Debug)]
pub struct MessageCell {
    options: CellOptions,
    message_id: Option<MessageId>,
    direction: Direction,
    body: Option<String>,
    generation: u64,
    bubble: Option<AttachmentBubbleLayout>,
    expiration: Option<ExpirationTimerController>,
}

impl Default for MessageCell {
    fn default() -> Self {
        Self::new(CellOptions::default())
    }
}

impl MessageCell {
    pub fn new(options: CellOptions) -> Self {
        Self {
            options,
            message_id: None,
            direction: Direction::Incoming,
            body: None,
            generation: 0,
            bubble: None,
            expiration: None,
        }
    }

    /// Message currently shown, if any.
    pub fn message_id(&self) -> Option<MessageId> {
        self.message_id
    }

    /// Incremented on every `configure`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn bubble(&self) -> Option<&AttachmentBubbleLayout> {
        self.bubble.as_ref()
    }

    /// The countdown, for cells showing a disappearing message.
    pub fn expiration(&self) -> Option<&ExpirationTimerController> {
        self.expiration.as_ref()
    }

    /// Show `message` in this cell, replacing whatever it showed before.
    ///
    /// On error the cell is left empty.
    pub fn configure(
        &mut self,
        message: &ConversationMessage,
        scheduler: &mut dyn Scheduler,
        now: f64,
    ) -> Result<()> {
        self.prepare_for_reuse(scheduler);
        self.generation += 1;

        let bubble = match &message.attachment {
            Some(attachment) => Some(
                AttachmentBubbleLayout::new(attachment.clone(), message.direction.is_incoming())?
                    .with_max_width(self.options.max_bubble_width),
            ),
            None => None,
        };

        self.message_id = Some(message.id);
        self.direction = message.direction;
        self.body = message.body.clone();
        self.bubble = bubble;

        if let Some(exp) = message.expiration {
            self.start_expiration_timer(
                scheduler,
                exp.expires_at_seconds,
                exp.initial_duration_seconds,
                now,
            );
        }

        debug!(
            message_id = message.id,
            generation = self.generation,
            attachment = self.bubble.is_some(),
            disappearing = message.is_disappearing(),
            "Configured cell"
        );
        Ok(())
    }

    /// Release everything tied to the current message.
    pub fn prepare_for_reuse(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(mut controller) = self.expiration.take() {
            controller.stop(scheduler);
        }
        if let Some(id) = self.message_id.take() {
            debug!(message_id = id, generation = self.generation, "Recycling cell");
        }
        self.body = None;
        self.bubble = None;
    }

    /// Start (or restart) the countdown shown next to this cell.
    pub fn start_expiration_timer(
        &mut self,
        scheduler: &mut dyn Scheduler,
        expires_at_seconds: f64,
        initial_duration_seconds: u32,
        now: f64,
    ) {
        let tick_interval = self.options.tick_interval;
        self.expiration
            .get_or_insert_with(|| ExpirationTimerController::new(tick_interval))
            .start(scheduler, expires_at_seconds, initial_duration_seconds, now);
    }

    /// Stop the countdown, if any. Safe to call repeatedly.
    pub fn stop_expiration_timer(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(controller) = self.expiration.as_mut() {
            controller.stop(scheduler);
        }
    }

    /// Width reserved for the countdown column: zero unless a timer is displayed.
    pub fn expiration_timer_width(&self) -> u16 {
        let visible = self
            .expiration
            .as_ref()
            .is_some_and(|c| c.view().is_visible());
        if self.options.timer_column && visible {
            EXPIRATION_TIMER_WIDTH
        } else {
            0
        }
    }

    /// Route a run-loop tick to the countdown.
    pub fn handle_tick(
        &mut self,
        scheduler: &mut dyn Scheduler,
        handle: TickHandle,
        now: f64,
    ) -> TickOutcome {
        match self.expiration.as_mut() {
            Some(controller) => controller.on_tick(scheduler, handle, now),
            None => TickOutcome::Stale,
        }
    }

    /// Lay the row out inside `area`.
    ///
    /// The timer column sits on the inner side of the bubble: right of
    /// incoming bubbles, left of outgoing ones.
    pub fn layout(&mut self, area: Rect) -> CellLayout {
        if self.message_id.is_none() {
            return CellLayout::default();
        }

        let timer_width = self.expiration_timer_width().min(area.width);
        let column = match self.direction {
            Direction::Incoming => Rect::new(area.x, area.y, area.width - timer_width, area.height),
            Direction::Outgoing => Rect::new(
                area.x + timer_width,
                area.y,
                area.width - timer_width,
                area.height,
            ),
        };

        let mut layout = CellLayout::default();
        let frame = if let Some(bubble) = self.bubble.as_mut() {
            let view = Size {
                width: column.width,
                height: column.height,
            };
            let contents = bubble.create_contents(view).anchored_at(column.x, column.y);
            let frame = contents.frame;
            if has_text(self.body.as_deref()) && frame.bottom() < column.bottom() {
                layout.caption = Some(Rect::new(frame.x, frame.bottom(), frame.width, CAPTION_HEIGHT));
            }
            layout.bubble = Some(contents);
            frame
        } else {
            let frame = self.text_frame(column);
            layout.text = Some(frame);
            frame
        };

        if timer_width > 0 && frame.height > 0 {
            let x = match self.direction {
                Direction::Incoming => frame.right(),
                Direction::Outgoing => frame.x - timer_width,
            };
            let y = frame.y + frame.height / 2;
            layout.timer = Some(Rect::new(x, y, timer_width, 1));
        }

        layout
    }

    fn text_frame(&self, column: Rect) -> Rect {
        let text_width = self.body.as_deref().map_or(0, UnicodeWidthStr::width);
        let wanted = u16::try_from(text_width)
            .unwrap_or(u16::MAX)
            .saturating_add(TEXT_CHROME);
        let width = wanted.min(self.options.max_bubble_width).min(column.width);
        let height = TEXT_ROW_HEIGHT.min(column.height);
        let x = match self.direction {
            Direction::Incoming => column.x,
            Direction::Outgoing => column.right() - width,
        };
        Rect::new(x, column.y, width, height)
    }
}
