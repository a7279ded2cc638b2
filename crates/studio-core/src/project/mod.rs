//! Project domain module.
//!
//! # Module Structure
//!
//! - `model`: Project entity and status (`Project`, `ProjectStatus`)
//! - `deploy`: Deploy request types (`DeployRequest`, `DeployState`)
//! - `event`: Status transition events published by the lifecycle orchestrator
//! - `seed`: The fixed project set supplied at session bootstrap

mod deploy;
mod event;
mod model;
mod seed;

pub use deploy::{DeployRequest, DeployState};
pub use event::LifecycleEvent;
pub use model::{Project, ProjectStatus};
pub use seed::seed_projects;
