//! External collaborators of the studio orchestrator.
//!
//! - `GeminiProvider`: live text generation over the Gemini REST API
//! - `SimulatedProvider`: offline canned responses
//! - `HttpResourceApi`: backend resource API client
//!
//! `build_provider` picks the live or simulated provider once, at construction.

pub mod backend_client;
pub mod config;
pub mod gemini_provider;
pub mod simulated_provider;

use std::sync::Arc;
use std::time::Duration;
use studio_core::config::{ProviderSettings, SecretConfig};
use studio_core::provider::GenerationProvider;

pub use backend_client::HttpResourceApi;
pub use gemini_provider::GeminiProvider;
pub use simulated_provider::SimulatedProvider;

/// Selects the provider implementation for a session.
///
/// Live mode requires an API key and `force_simulation = false`; anything
/// else runs in simulation mode. The secret file's model name overrides the
/// configured model.
pub fn build_provider(
    settings: &ProviderSettings,
    secrets: &SecretConfig,
) -> Arc<dyn GenerationProvider> {
    let api_key = config::resolve_api_key(secrets);

    match api_key {
        Some(key) if !settings.force_simulation => {
            let model = secrets
                .gemini
                .as_ref()
                .and_then(|g| g.model_name.clone())
                .unwrap_or_else(|| settings.model.clone());
            tracing::info!(%model, "Using live Gemini provider");
            Arc::new(GeminiProvider::new(key, model))
        }
        _ => {
            tracing::info!("No API key configured, using simulated provider");
            Arc::new(SimulatedProvider::new(
                Duration::from_millis(settings.simulated_blueprint_delay_ms),
                Duration::from_millis(settings.simulated_chat_delay_ms),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::provider::ProviderMode;

    #[test]
    fn test_force_simulation_wins_over_key() {
        let settings = ProviderSettings {
            force_simulation: true,
            ..ProviderSettings::default()
        };
        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "k"}}"#).unwrap();

        let provider = build_provider(&settings, &secrets);
        assert_eq!(provider.mode(), ProviderMode::Simulated);
    }
}
