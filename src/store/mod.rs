//! Loading conversations from disk.

pub mod conversation;

pub use conversation::{load_conversation, sample_conversation, Conversation};
