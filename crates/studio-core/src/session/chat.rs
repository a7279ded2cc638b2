//! Append-only chat transcript.

use chrono::{DateTime, Duration, Utc};

use super::message::{ChatMessage, MessageRole};
use crate::provider::HistoryTurn;

/// Opening assistant message of a new studio session.
pub const DEFAULT_GREETING: &str = "Hello Architect. I am TEOS Gen. Describe the application you want to build, and I will generate the full stack scaffold compliant with TESL v2.0.";

/// Ordered transcript of one session.
///
/// Appends are the only mutation. Timestamps are assigned at append time
/// when the caller does not supply one, and are bumped forward when needed so
/// that they stay strictly increasing in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript that opens with an assistant greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut session = Self::new();
        session.append(MessageRole::Assistant, greeting);
        session
    }

    /// Appends a message stamped with the current time.
    pub fn append(&mut self, role: MessageRole, content: impl Into<String>) -> &ChatMessage {
        self.append_at(role, content, None)
    }

    /// Appends a message with an optional caller-supplied timestamp.
    ///
    /// A timestamp that is not later than the previous message is moved to
    /// one microsecond after it.
    pub fn append_at(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> &ChatMessage {
        let candidate = timestamp.unwrap_or_else(Utc::now);
        let timestamp = match self.messages.last() {
            Some(last) if candidate <= last.timestamp => {
                last.timestamp + Duration::microseconds(1)
            }
            _ => candidate,
        };

        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            timestamp,
        });
        // Just pushed, so the transcript is non-empty
        &self.messages[self.messages.len() - 1]
    }

    /// Read-only snapshot of the transcript in arrival order.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// Role/content pairs in arrival order, as handed to a generation provider.
    pub fn turns(&self) -> Vec<HistoryTurn> {
        self.messages
            .iter()
            .map(|m| HistoryTurn::new(m.role, m.content.clone()))
            .collect()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
