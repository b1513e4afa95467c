//! Core data model types for conversation messages and attachments.

pub mod attachment;
pub mod message;
