use super::model::Blueprint;
use crate::error::{Result, StudioError};

/// Holds at most one blueprint per session.
///
/// Once set, the blueprint is immutable until `clear` (session reset).
#[derive(Debug, Clone, Default)]
pub struct BlueprintStore {
    current: Option<Blueprint>,
}

impl BlueprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the blueprint if none is set yet.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::BlueprintAlreadySet` if the session already holds one;
    /// the stored blueprint is left untouched.
    pub fn try_set(&mut self, blueprint: Blueprint) -> Result<&Blueprint> {
        if self.current.is_some() {
            return Err(StudioError::BlueprintAlreadySet);
        }
        Ok(self.current.insert(blueprint))
    }

    pub fn current(&self) -> Option<&Blueprint> {
        self.current.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    /// Drops the current blueprint. Only used by session reset.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
