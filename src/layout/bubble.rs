//! Geometry of the generic attachment bubble.
//!
//! A bubble is a bordered box holding an icon on its leading edge and two
//! stacked labels: the filename on top, the human-readable size below.
//!
//! ```text
//! ┌────────────────────────────┐
//! │ DOC   quarterly-report.pdf │
//! │       1.20 MiB             │
//! └────────────────────────────┘
//! ```
//!
//! All frames are expressed in terminal cells relative to the top-left
//! corner of the view the caller allotted.

use ratatui::layout::{Rect, Size};
use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::model::attachment::{AttachmentDescriptor, AttachmentKind};
use crate::model::message::Direction;

/// Height reserved for any attachment bubble: two borders plus two label rows.
pub const BUBBLE_HEIGHT: u16 = 4;

/// Default upper bound on the bubble width.
pub const DEFAULT_MAX_BUBBLE_WIDTH: u16 = 48;

/// Width of the icon slot.
const ICON_WIDTH: u16 = 5;
/// Horizontal padding between the border and the content.
const H_PADDING: u16 = 1;
/// Space between the icon and the labels.
const ICON_GAP: u16 = 1;
/// Border thickness on each side.
const BORDER: u16 = 1;

/// Height of an attachment bubble, independent of any attachment.
///
/// Lists call this for every row while estimating heights, before any
/// content is laid out.
pub const fn bubble_height() -> u16 {
    BUBBLE_HEIGHT
}

/// Frames and fitted texts produced by [`AttachmentBubbleLayout::create_contents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleContents {
    /// The size these contents were computed for.
    pub view_size: Size,
    /// Outer frame of the bubble, border included.
    pub frame: Rect,
    pub icon: Rect,
    pub filename: Rect,
    pub size_label: Rect,
    pub icon_text: String,
    pub filename_text: String,
    pub size_text: String,
}

impl BubbleContents {
    /// Every frame lies inside `size` (anchored at the origin).
    pub fn fits_within(&self, size: Size) -> bool {
        [self.frame, self.icon, self.filename, self.size_label]
            .iter()
            .all(|r| r.right() <= size.width && r.bottom() <= size.height)
    }

    /// The same contents moved to an absolute origin, for drawing.
    pub fn anchored_at(&self, x: u16, y: u16) -> Self {
        let shift = |r: Rect| Rect::new(r.x.saturating_add(x), r.y.saturating_add(y), r.width, r.height);
        Self {
            frame: shift(self.frame),
            icon: shift(self.icon),
            filename: shift(self.filename),
            size_label: shift(self.size_label),
            ..self.clone()
        }
    }
}

/// Lays out one attachment inside a chat bubble.
#[derive(Debug, Clone)]
pub struct AttachmentBubbleLayout {
    attachment: AttachmentDescriptor,
    direction: Direction,
    max_width: u16,
    contents: Option<BubbleContents>,
}

impl AttachmentBubbleLayout {
    /// Build a layout for a stored attachment.
    ///
    /// Fails with [`ChatCellError::InvalidAttachment`](crate::error::ChatCellError::InvalidAttachment)
    /// when the descriptor cannot be rendered.
    pub fn new(attachment: AttachmentDescriptor, is_incoming: bool) -> Result<Self> {
        attachment.validate()?;
        Ok(Self {
            attachment,
            direction: Direction::from_incoming(is_incoming),
            max_width: DEFAULT_MAX_BUBBLE_WIDTH,
            contents: None,
        })
    }

    /// Override the maximum bubble width (clamped to the minimum that holds the icon).
    pub fn with_max_width(mut self, max_width: u16) -> Self {
        self.max_width = max_width.max(min_bubble_width());
        self
    }

    pub fn attachment(&self) -> &AttachmentDescriptor {
        &self.attachment
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> AttachmentKind {
        self.attachment.kind()
    }

    /// Contents from the last [`create_contents`](Self::create_contents) call.
    pub fn contents(&self) -> Option<&BubbleContents> {
        self.contents.as_ref()
    }

    /// Width the bubble would take with no constraint other than `max_width`.
    pub fn preferred_width(&self) -> u16 {
        let size_text = self.attachment.display_size();
        let label_width = self
            .attachment
            .display_name()
            .width()
            .max(size_text.width());
        let label_width = u16::try_from(label_width).unwrap_or(u16::MAX);
        min_bubble_width()
            .saturating_add(ICON_GAP)
            .saturating_add(label_width)
            .min(self.max_width)
    }

    /// Arrange the icon and labels to fit within `view_size`.
    ///
    /// Every call starts from scratch, so a resized or reused cell never
    /// keeps frames from an earlier size.
    pub fn create_contents(&mut self, view_size: Size) -> &BubbleContents {
        let width = self.preferred_width().min(view_size.width);
        let height = BUBBLE_HEIGHT.min(view_size.height);
        let x = match self.direction {
            Direction::Incoming => 0,
            Direction::Outgoing => view_size.width - width,
        };
        let frame = Rect::new(x, 0, width, height);
        let inner = content_area(frame);

        let icon = Rect::new(inner.x, inner.y, ICON_WIDTH.min(inner.width), inner.height);
        let labels_x = icon.right().saturating_add(ICON_GAP).min(inner.right());
        let labels_width = inner.right() - labels_x;
        let filename = Rect::new(labels_x, inner.y, labels_width, inner.height.min(1));
        let size_label = if inner.height >= 2 {
            Rect::new(labels_x, inner.y + 1, labels_width, 1)
        } else {
            Rect::new(labels_x, filename.bottom(), labels_width, 0)
        };

        let contents = BubbleContents {
            view_size,
            frame,
            icon,
            filename,
            size_label,
            icon_text: fit_to_width(self.kind().icon(), icon.width as usize),
            filename_text: fit_to_width(self.attachment.display_name(), filename.width as usize),
            size_text: fit_to_width(&self.attachment.display_size(), size_label.width as usize),
        };

        tracing::trace!(
            width = view_size.width,
            height = view_size.height,
            bubble_width = frame.width,
            "Laid out attachment bubble"
        );

        self.contents.insert(contents)
    }
}

/// Smallest bubble that still shows the full icon slot.
const fn min_bubble_width() -> u16 {
    2 * BORDER + 2 * H_PADDING + ICON_WIDTH
}

/// Area inside the border and padding, or an empty rect at the frame origin
/// when the frame is too small to hold anything.
fn content_area(frame: Rect) -> Rect {
    let horizontal = BORDER + H_PADDING;
    if frame.width <= 2 * horizontal || frame.height <= 2 * BORDER {
        return Rect::new(frame.x, frame.y, 0, 0);
    }
    Rect::new(
        frame.x + horizontal,
        frame.y + BORDER,
        frame.width - 2 * horizontal,
        frame.height - 2 * BORDER,
    )
}

/// Truncate `s` to at most `max_width` display columns, ending with `…` when cut.
pub(crate) fn fit_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    // Measure the whole prefix: a trailing selector can widen the previous char
    let mut result = String::new();
    for ch in s.chars() {
        result.push(ch);
        if result.width() + 1 > max_width {
            result.pop();
            break;
        }
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: u64) -> AttachmentDescriptor {
        AttachmentDescriptor::new("application/pdf", Some(name.to_string()), size)
    }

    fn size(width: u16, height: u16) -> Size {
        Size { width, height }
    }

    #[test]
    fn test_bubble_height_is_content_independent() {
        let first = bubble_height();
        for _ in 0..10 {
            assert_eq!(bubble_height(), first);
        }

        let mut small = AttachmentBubbleLayout::new(pdf("a.pdf", 1), true).unwrap();
        let mut large =
            AttachmentBubbleLayout::new(pdf(&"x".repeat(200), 9_000_000_000), false).unwrap();
        small.create_contents(size(80, 10));
        large.create_contents(size(80, 10));
        assert_eq!(bubble_height(), first);
        assert_eq!(small.contents().unwrap().frame.height, bubble_height());
        assert_eq!(large.contents().unwrap().frame.height, bubble_height());
    }

    #[test]
    fn test_rejects_invalid_descriptor() {
        let bad = AttachmentDescriptor::new("", Some("x".into()), 1);
        assert!(AttachmentBubbleLayout::new(bad, true).is_err());
    }

    #[test]
    fn test_no_contents_before_layout() {
        let layout = AttachmentBubbleLayout::new(pdf("a.pdf", 1), true).unwrap();
        assert!(layout.contents().is_none());
    }

    #[test]
    fn test_incoming_aligns_left_outgoing_aligns_right() {
        let mut incoming = AttachmentBubbleLayout::new(pdf("notes.pdf", 2048), true).unwrap();
        let mut outgoing = AttachmentBubbleLayout::new(pdf("notes.pdf", 2048), false).unwrap();

        let inc = incoming.create_contents(size(60, 4)).clone();
        let out = outgoing.create_contents(size(60, 4)).clone();

        assert_eq!(inc.frame.x, 0);
        assert_eq!(out.frame.right(), 60);
        assert_eq!(inc.frame.width, out.frame.width);
        // Icon leads in both directions.
        assert!(inc.icon.x < inc.filename.x);
        assert!(out.icon.x < out.filename.x);
    }

    #[test]
    fn test_labels_show_name_and_size() {
        let mut layout = AttachmentBubbleLayout::new(pdf("notes.pdf", 2048), true).unwrap();
        let contents = layout.create_contents(size(60, 4));
        assert_eq!(contents.icon_text, "DOC");
        assert_eq!(contents.filename_text, "notes.pdf");
        assert!(contents.size_text.ends_with("KiB"));
        assert_eq!(contents.size_label.y, contents.filename.y + 1);
    }

    #[test]
    fn test_relayout_shrinking_then_growing() {
        let mut layout =
            AttachmentBubbleLayout::new(pdf("a-rather-long-file-name.pdf", 123_456), false)
                .unwrap();

        let narrow = size(14, 4);
        let c = layout.create_contents(narrow).clone();
        assert!(c.fits_within(narrow));
        assert!(c.filename_text.ends_with('…'));
        assert!(c.filename_text.width() <= c.filename.width as usize);

        let wide = size(70, 6);
        let c = layout.create_contents(wide).clone();
        assert!(c.fits_within(wide));
        assert_eq!(c.view_size, wide);
        assert_eq!(c.filename_text, "a-rather-long-file-name.pdf");
        assert_eq!(c.frame.right(), 70);
    }

    #[test]
    fn test_degenerate_sizes_stay_inside_view() {
        let mut layout = AttachmentBubbleLayout::new(pdf("file.pdf", 10), false).unwrap();
        for (w, h) in [(0, 0), (1, 1), (3, 2), (8, 3), (10, 1), (4, 10)] {
            let view = size(w, h);
            let c = layout.create_contents(view);
            assert!(c.fits_within(view), "overflow at {w}x{h}: {c:?}");
            assert!(c.filename_text.width() <= c.filename.width as usize);
            assert!(c.size_text.width() <= c.size_label.width as usize);
        }
    }

    #[test]
    fn test_emoji_sequence_filename_fits_label() {
        let heart = "\u{2764}\u{fe0f}";
        let fitted = fit_to_width(&format!("{heart}{heart}{heart}.pdf"), 3);
        assert!(fitted.width() <= 3, "{fitted:?} is {} columns", fitted.width());
        assert!(fitted.ends_with('…'));

        let mut layout = AttachmentBubbleLayout::new(pdf(&heart.repeat(20), 10), true).unwrap();
        for w in [6, 12, 20, 48] {
            let view = size(w, 4);
            let c = layout.create_contents(view);
            assert!(c.fits_within(view));
            assert!(
                c.filename_text.width() <= c.filename.width as usize,
                "label width {} text width {}",
                c.filename.width,
                c.filename_text.width()
            );
        }
    }

    #[test]
    fn test_max_width_caps_bubble() {
        let mut layout = AttachmentBubbleLayout::new(pdf(&"n".repeat(100), 10), true)
            .unwrap()
            .with_max_width(20);
        let c = layout.create_contents(size(80, 4));
        assert_eq!(c.frame.width, 20);
    }

    #[test]
    fn test_anchored_at_moves_frames_only() {
        let mut layout = AttachmentBubbleLayout::new(pdf("a.pdf", 1), true).unwrap();
        let c = layout.create_contents(size(30, 4)).clone();
        let moved = c.anchored_at(5, 7);
        assert_eq!(moved.frame.x, c.frame.x + 5);
        assert_eq!(moved.icon.y, c.icon.y + 7);
        assert_eq!(moved.filename_text, c.filename_text);
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width("hello", 10), "hello");
        assert_eq!(fit_to_width("hello", 5), "hello");
        assert_eq!(fit_to_width("hello", 4), "hel…");
        assert_eq!(fit_to_width("hello", 1), "…");
        assert_eq!(fit_to_width("hello", 0), "");
        // Wide characters take two columns each.
        assert_eq!(fit_to_width("日本語", 4), "日…");
    }
}
