//! Project domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a project.
///
/// `ComplianceCheck` only appears in seed data; the deploy flow moves a
/// project to `Building` and then `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Deployed and serving (also the idle state between deploys).
    Active,
    /// A deployment has been acknowledged and the build is running.
    Building,
    /// Awaiting compliance review.
    ComplianceCheck,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Building => "building",
            Self::ComplianceCheck => "compliance_check",
        };
        f.write_str(label)
    }
}

/// A software-build project tracked by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Opaque unique identifier
    pub id: String,
    /// Human-readable project name
    pub name: String,
    /// Technology stack labels, in display order
    pub tech_stack: Vec<String>,
    /// Current lifecycle status
    pub status: ProjectStatus,
    /// Compliance score (0-100), supplied externally and never recomputed
    pub compliance_score: u8,
    /// Relative label from seed data ("2h ago") or an RFC 3339 timestamp
    pub last_updated: String,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tech_stack: &[&str],
        status: ProjectStatus,
        compliance_score: u8,
        last_updated: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tech_stack: tech_stack.iter().map(|s| s.to_string()).collect(),
            status,
            compliance_score: compliance_score.min(100),
            last_updated: last_updated.into(),
        }
    }

    /// Returns true while a build is running.
    pub fn is_building(&self) -> bool {
        self.status == ProjectStatus::Building
    }
}
