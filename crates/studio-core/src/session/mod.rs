//! Chat session domain module.
//!
//! - `message`: Message types (`MessageRole`, `ChatMessage`)
//! - `chat`: The append-only transcript (`ChatSession`)

mod chat;
mod message;

pub use chat::{ChatSession, DEFAULT_GREETING};
pub use message::{ChatMessage, MessageRole};
