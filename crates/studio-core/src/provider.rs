//! Generation provider capability.
//!
//! The orchestrator only sees this trait. `studio-interaction` supplies the
//! live (Gemini) and simulated implementations and picks one at construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::session::MessageRole;

/// Which kind of call the provider is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    /// Expecting a blueprint JSON payload.
    Blueprint,
    /// Expecting a conversational answer.
    Chat,
}

/// How a provider produces text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMode {
    Live,
    Simulated,
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Simulated => f.write_str("simulated"),
        }
    }
}

/// One prior transcript entry passed as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryTurn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A single generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub prompt: String,
    /// Prior conversation in arrival order; empty for blueprint calls.
    pub history: Vec<HistoryTurn>,
}

impl GenerationRequest {
    /// A blueprint call: prompt only, no history.
    pub fn blueprint(prompt: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::Blueprint,
            prompt: prompt.into(),
            history: Vec::new(),
        }
    }

    /// A chat call carrying the prior transcript.
    pub fn chat(prompt: impl Into<String>, history: Vec<HistoryTurn>) -> Self {
        Self {
            kind: GenerationKind::Chat,
            prompt: prompt.into(),
            history,
        }
    }
}

/// Failure of the external generation capability.
///
/// The display text is what the user sees in the transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Network or transport failure
    #[error("I'm having trouble connecting to the TEOS Core ({0}). Please check your network.")]
    Transport(String),

    /// The provider refused the call because of quota or rate limits
    #[error("Generation quota exceeded ({0}). Please check your API quota.")]
    Quota(String),

    /// Missing, malformed or rejected credentials
    #[error("The generation provider rejected the credentials ({0}).")]
    Credentials(String),

    /// Any other non-success answer from the provider
    #[error("The generation provider returned an error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A successful answer with no text in it
    #[error("The generation provider returned an empty response.")]
    EmptyResponse,

    /// No answer within the configured request timeout
    #[error("The generation provider did not answer within {0} seconds. Please try again.")]
    Timeout(u64),
}

/// Text-generation capability consumed by the dashboard.
///
/// Implementations never panic on provider failures; every failure is
/// returned as a `ProviderError`. No retries happen at this layer.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Whether this provider talks to a real backend.
    fn mode(&self) -> ProviderMode;

    /// Model or backend label for display.
    fn model(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_request_has_no_history() {
        let request = GenerationRequest::blueprint("Create a shop");
        assert_eq!(request.kind, GenerationKind::Blueprint);
        assert!(request.history.is_empty());
    }

    #[test]
    fn test_provider_error_text_is_readable() {
        let err = ProviderError::Quota("429 RESOURCE_EXHAUSTED".into());
        assert!(err.to_string().contains("quota"));
    }
}
