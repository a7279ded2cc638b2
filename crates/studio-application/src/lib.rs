//! Application layer for TEOS Studio.
//!
//! Coordinates the domain types from `studio-core` into the two stateful
//! services a dashboard session needs: the deploy lifecycle orchestrator and
//! the chat/blueprint controller on top of it.

pub mod dashboard;
pub mod lifecycle;

pub use dashboard::{DashboardController, DashboardSnapshot, MessageOutcome, ReplyStatus};
pub use lifecycle::LifecycleOrchestrator;
