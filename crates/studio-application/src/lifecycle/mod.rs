//! Project lifecycle management.
//!
//! The orchestrator exclusively owns the project registry and deploy
//! requests; everything outside reads snapshots.

mod orchestrator;

pub use orchestrator::LifecycleOrchestrator;
