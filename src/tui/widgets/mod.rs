//! TUI widgets for rendering different UI panels.

pub mod attachment_bubble;
pub mod conversation;
pub mod expiration_timer;
pub mod header_bar;
pub mod help_popup;
pub mod status_bar;
