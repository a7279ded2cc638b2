//! Bootstrap project set.

use super::{Project, ProjectStatus};

/// Returns the fixed initial projects for a new dashboard session.
pub fn seed_projects() -> Vec<Project> {
    vec![
        Project::new(
            "1",
            "pilot-bank-core",
            &["Next.js", "FastAPI"],
            ProjectStatus::Active,
            98,
            "2h ago",
        ),
        Project::new(
            "2",
            "teos-commerce-v1",
            &["React Native", "Node"],
            ProjectStatus::Building,
            85,
            "5m ago",
        ),
        Project::new(
            "3",
            "internal-audit-log",
            &["FastAPI", "Postgres"],
            ProjectStatus::ComplianceCheck,
            100,
            "1d ago",
        ),
    ]
}
