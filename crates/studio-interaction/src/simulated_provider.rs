//! SimulatedProvider - offline stand-in used when no API key is configured.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use studio_core::provider::{
    GenerationKind, GenerationProvider, GenerationRequest, ProviderError, ProviderMode,
};

pub const SIMULATED_CHAT_REPLY: &str = "I am simulating the TEOS Gen AI. Connect a valid API Key to get real architectural advice.";

/// Returns canned payloads after a fixed artificial delay. Never fails.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    blueprint_delay: Duration,
    chat_delay: Duration,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500), Duration::from_millis(1000))
    }
}

impl SimulatedProvider {
    pub fn new(blueprint_delay: Duration, chat_delay: Duration) -> Self {
        Self {
            blueprint_delay,
            chat_delay,
        }
    }

    /// The canned blueprint payload, pretty-printed like a model answer.
    pub fn blueprint_payload() -> String {
        let payload = json!({
            "appName": "TEOS Generated App",
            "stack": ["Next.js 15", "FastAPI", "PostgreSQL"],
            "features": ["Auth (JWT)", "RBAC", "Audit Logging"],
            "compliance": "TESL v2.0 Compliant",
            "message": "I've generated a blueprint based on your request. The system includes a secure backend API and a responsive React frontend."
        });
        format!("{payload:#}")
    }
}

#[async_trait]
impl GenerationProvider for SimulatedProvider {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Simulated
    }

    fn model(&self) -> &str {
        "simulation"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        match request.kind {
            GenerationKind::Blueprint => {
                tokio::time::sleep(self.blueprint_delay).await;
                Ok(Self::blueprint_payload())
            }
            GenerationKind::Chat => {
                tokio::time::sleep(self.chat_delay).await;
                Ok(SIMULATED_CHAT_REPLY.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::blueprint::Blueprint;
    use studio_core::provider::HistoryTurn;
    use studio_core::session::MessageRole;

    #[tokio::test(start_paused = true)]
    async fn test_blueprint_payload_decodes() {
        let provider = SimulatedProvider::default();
        let started = tokio::time::Instant::now();

        let text = provider
            .generate(GenerationRequest::blueprint("Create a fintech app"))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1500));
        let blueprint = Blueprint::decode(&text).unwrap();
        assert_eq!(blueprint.app_name, "TEOS Generated App");
        assert_eq!(blueprint.stack, vec!["Next.js 15", "FastAPI", "PostgreSQL"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_reply_ignores_history() {
        let provider = SimulatedProvider::default();
        let history = vec![HistoryTurn::new(MessageRole::User, "earlier")];

        let text = provider
            .generate(GenerationRequest::chat("What databases?", history))
            .await
            .unwrap();

        assert_eq!(text, SIMULATED_CHAT_REPLY);
        assert_eq!(provider.mode(), ProviderMode::Simulated);
    }
}
