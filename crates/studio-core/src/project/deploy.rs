//! Deploy request types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Confirmation state of a deploy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    /// Created, waiting for the user to confirm or cancel.
    Pending,
    /// Confirmed and handed to the orchestrator's timed transition.
    Confirmed,
    /// Cancelled before confirmation.
    Cancelled,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A user's request to deploy one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    /// Unique request identifier (UUID format)
    pub id: String,
    /// Target project id
    pub project_id: String,
    /// Timestamp when the request was created (ISO 8601 format)
    pub requested_at: String,
    pub state: DeployState,
}

impl DeployRequest {
    /// Creates a pending request for the given project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            requested_at: chrono::Utc::now().to_rfc3339(),
            state: DeployState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == DeployState::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_is_pending_with_unique_id() {
        let a = DeployRequest::new("1");
        let b = DeployRequest::new("1");
        assert!(a.is_pending());
        assert_eq!(a.project_id, "1");
        assert_ne!(a.id, b.id);
    }
}
