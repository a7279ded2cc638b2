//! Error types for the studio orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the studio orchestration core.
///
/// Every failure the core can produce at runtime is one of these variants;
/// none of them is fatal to the session.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudioError {
    /// A deploy operation referenced a project id that is not in the registry
    #[error("Unknown project: '{0}'")]
    UnknownProject(String),

    /// A confirm was attempted while the project already has a deploy in flight
    #[error("Project '{0}' is already deploying")]
    AlreadyDeploying(String),

    /// The deploy request is not in a state that allows the operation
    #[error("Deploy request '{request_id}' is {state}, expected {expected}")]
    InvalidState {
        request_id: String,
        state: String,
        expected: &'static str,
    },

    /// A deploy request id that was never issued by this orchestrator
    #[error("Unknown deploy request: '{0}'")]
    UnknownDeployRequest(String),

    /// The session already holds a blueprint
    #[error("A blueprint is already set for this session")]
    BlueprintAlreadySet,

    /// Provider text could not be decoded into a blueprint
    #[error("Blueprint decode error: {0}")]
    Decode(String),

    /// A message is still being processed for this session
    #[error("Another message is still being processed")]
    Busy,

    /// The submitted message had no content
    #[error("Message is empty")]
    EmptyMessage,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Backend resource API failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudioError {
    /// Creates an InvalidState error
    pub fn invalid_state(
        request_id: impl Into<String>,
        state: impl std::fmt::Display,
        expected: &'static str,
    ) -> Self {
        Self::InvalidState {
            request_id: request_id.into(),
            state: state.to_string(),
            expected,
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is an UnknownProject error
    pub fn is_unknown_project(&self) -> bool {
        matches!(self, Self::UnknownProject(_))
    }

    /// Check if this is an AlreadyDeploying error
    pub fn is_already_deploying(&self) -> bool {
        matches!(self, Self::AlreadyDeploying(_))
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<toml::de::Error> for StudioError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, StudioError>`.
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_message() {
        let err = StudioError::invalid_state("req-1", "confirmed", "pending");
        assert!(err.is_invalid_state());
        assert_eq!(
            err.to_string(),
            "Deploy request 'req-1' is confirmed, expected pending"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: StudioError = io.into();
        assert!(matches!(err, StudioError::Io { .. }));
    }
}
