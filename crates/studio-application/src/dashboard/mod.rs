//! Composition root wiring user intents to the session components.

mod controller;
mod snapshot;

pub use controller::{DashboardController, MessageOutcome, ReplyStatus};
pub use snapshot::DashboardSnapshot;
