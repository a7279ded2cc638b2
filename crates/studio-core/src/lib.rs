//! Domain layer of TEOS Studio.
//!
//! Holds the data model (projects, deploy requests, chat messages,
//! blueprints), the pure session components and the capability traits the
//! orchestrator depends on. Nothing here performs IO except config loading.

pub mod blueprint;
pub mod config;
pub mod error;
pub mod intent;
pub mod project;
pub mod provider;
pub mod resource;
pub mod session;

// Re-export common error type
pub use error::{Result, StudioError};
