use serde::{Deserialize, Serialize};

use super::ProjectStatus;

/// A status transition applied to a project by the lifecycle orchestrator.
///
/// Exactly one event is published per transition, so a full deploy cycle
/// produces two: `-> Building` and `-> Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub project_id: String,
    pub from: ProjectStatus,
    pub to: ProjectStatus,
    /// Value written to the project's `last_updated`
    pub at: String,
}
