//! `chatcell`: conversation-view core for a messaging client.
//!
//! Computes attachment-bubble geometry and drives disappearing-message
//! countdowns bound to recycled conversation cells. A terminal preview
//! renders conversations with both.

pub mod cell;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod store;
pub mod timer;
pub mod tui;
