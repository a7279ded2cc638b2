use serde::Serialize;
use studio_core::blueprint::Blueprint;
use studio_core::project::{DeployRequest, Project};
use studio_core::provider::ProviderMode;
use studio_core::session::ChatMessage;

/// Read-only view of the whole dashboard for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub projects: Vec<Project>,
    pub pending_deploys: Vec<DeployRequest>,
    pub messages: Vec<ChatMessage>,
    pub blueprint: Option<Blueprint>,
    /// True while a user message is being processed
    pub processing: bool,
    pub provider_mode: ProviderMode,
}
