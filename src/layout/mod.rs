//! Layout computation for conversation rows.

pub mod bubble;

pub use bubble::{bubble_height, AttachmentBubbleLayout, BubbleContents, BUBBLE_HEIGHT};
