//! Blueprint domain module.
//!
//! - `model`: The decoded scaffold description (`Blueprint`)
//! - `store`: Single-blueprint-per-session holder (`BlueprintStore`)

mod model;
mod store;

pub use model::{Blueprint, GENERIC_ACKNOWLEDGEMENT};
pub use store::BlueprintStore;
