//! Blueprint domain model and payload decoding.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Assistant reply used when a decoded blueprint carries no summary message.
pub const GENERIC_ACKNOWLEDGEMENT: &str = "I've generated a preliminary blueprint for your application. Review the structure on the right.";

/// Structured application scaffold derived from a natural-language build request.
///
/// The wire shape is the JSON object the generation provider returns:
/// `appName`, `stack`, `features`, `compliance` and an optional `message`.
/// Missing `stack`/`features` decode as empty lists; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub app_name: String,
    #[serde(default)]
    pub stack: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, alias = "complianceNote")]
    pub compliance: Option<String>,
    /// Human-readable summary shown in the transcript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Blueprint {
    /// Decodes provider text into a blueprint.
    ///
    /// A surrounding Markdown code fence (```json ... ```) is stripped first.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Decode` if the text is not a JSON object of the
    /// expected shape or if `appName` is blank.
    pub fn decode(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        let blueprint: Blueprint = serde_json::from_str(body)?;

        if blueprint.app_name.trim().is_empty() {
            return Err(StudioError::Decode("appName is empty".to_string()));
        }

        Ok(blueprint)
    }

    /// The transcript message announcing this blueprint.
    pub fn summary(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(GENERIC_ACKNOWLEDGEMENT)
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAYLOAD: &str = r#"{
        "appName": "TEOS Generated App",
        "stack": ["Next.js 15", "FastAPI", "PostgreSQL"],
        "features": ["Auth (JWT)", "RBAC", "Audit Logging"],
        "compliance": "TESL v2.0 Compliant",
        "message": "Blueprint ready."
    }"#;

    #[test]
    fn test_decode_full_payload() {
        let blueprint = Blueprint::decode(FULL_PAYLOAD).unwrap();
        assert_eq!(blueprint.app_name, "TEOS Generated App");
        assert_eq!(blueprint.stack, vec!["Next.js 15", "FastAPI", "PostgreSQL"]);
        assert_eq!(blueprint.features, vec!["Auth (JWT)", "RBAC", "Audit Logging"]);
        assert_eq!(blueprint.compliance.as_deref(), Some("TESL v2.0 Compliant"));
        assert_eq!(blueprint.summary(), "Blueprint ready.");
    }

    #[test]
    fn test_decode_tolerates_missing_lists_and_unknown_fields() {
        let blueprint =
            Blueprint::decode(r#"{"appName": "Ledger", "deployTarget": "edge", "tier": 3}"#)
                .unwrap();
        assert_eq!(blueprint.app_name, "Ledger");
        assert!(blueprint.stack.is_empty());
        assert!(blueprint.features.is_empty());
        assert_eq!(blueprint.summary(), GENERIC_ACKNOWLEDGEMENT);
    }

    #[test]
    fn test_decode_strips_code_fence() {
        let fenced = format!("```json\n{FULL_PAYLOAD}\n```");
        let blueprint = Blueprint::decode(&fenced).unwrap();
        assert_eq!(blueprint.app_name, "TEOS Generated App");
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        let err = Blueprint::decode("Error generating blueprint. Please check your network.")
            .unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_missing_or_blank_app_name() {
        assert!(Blueprint::decode(r#"{"stack": ["Rust"]}"#).is_err());
        assert!(Blueprint::decode(r#"{"appName": "  "}"#).is_err());
    }

    #[test]
    fn test_blank_message_falls_back_to_acknowledgement() {
        let blueprint = Blueprint::decode(r#"{"appName": "A", "message": ""}"#).unwrap();
        assert_eq!(blueprint.summary(), GENERIC_ACKNOWLEDGEMENT);
    }
}
