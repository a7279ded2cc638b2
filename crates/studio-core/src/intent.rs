//! Chat input classification.

use serde::{Deserialize, Serialize};

/// Trigger words that mark a message as a build request.
pub const DEFAULT_TRIGGERS: [&str; 3] = ["create", "build", "app"];

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Generate the session's application blueprint.
    BlueprintRequest,
    /// Conversational request answered with the full transcript as context.
    ChatRequest,
}

/// Decides whether free text is a blueprint request or a chat request.
///
/// A message is a `BlueprintRequest` iff its lower-cased text contains at
/// least one trigger as a substring and the session has no blueprint yet.
/// Once a blueprint exists every message is a `ChatRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentClassifier {
    triggers: Vec<String>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_triggers(DEFAULT_TRIGGERS)
    }
}

impl IntentClassifier {
    /// Builds a classifier from a custom trigger list.
    ///
    /// Triggers are lower-cased; blank entries are dropped.
    pub fn with_triggers<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let triggers = triggers
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { triggers }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn classify(&self, text: &str, blueprint_exists: bool) -> Intent {
        if blueprint_exists {
            return Intent::ChatRequest;
        }

        let lowered = text.to_lowercase();
        if self.triggers.iter().any(|t| lowered.contains(t.as_str())) {
            Intent::BlueprintRequest
        } else {
            Intent::ChatRequest
        }
    }
}
