use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use studio_core::blueprint::{Blueprint, BlueprintStore};
use studio_core::config::StudioConfig;
use studio_core::error::{Result, StudioError};
use studio_core::intent::{Intent, IntentClassifier};
use studio_core::project::{DeployRequest, LifecycleEvent, Project, seed_projects};
use studio_core::provider::{GenerationProvider, GenerationRequest, HistoryTurn, ProviderError};
use studio_core::resource::ResourceApi;
use studio_core::session::{ChatMessage, ChatSession, DEFAULT_GREETING, MessageRole};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;

use super::snapshot::DashboardSnapshot;
use crate::lifecycle::LifecycleOrchestrator;

/// How the assistant reply of a message round was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// A blueprint was decoded and stored; the reply is its summary.
    BlueprintStored,
    /// The blueprint payload did not decode; the reply is the raw provider text.
    RawFallback,
    /// The provider answered a chat request.
    Answered,
    /// The provider failed; the reply is the error text.
    ProviderFailed,
}

/// Result of one `handle_user_message` round.
#[derive(Debug, Clone, Serialize)]
pub struct MessageOutcome {
    pub intent: Intent,
    pub status: ReplyStatus,
    /// The assistant message appended to the transcript
    pub reply: ChatMessage,
}

/// Wires user intents to the lifecycle orchestrator, the generation provider
/// and the session state.
///
/// `DashboardController` is responsible for:
/// - Routing chat input to blueprint generation or conversation
/// - Folding provider results into the transcript and blueprint store
/// - Forwarding deploy intents to the orchestrator
/// - Exposing read-only snapshots
///
/// Message handling is single-flight: a second `handle_user_message` while
/// one is outstanding is rejected with `StudioError::Busy`.
pub struct DashboardController {
    orchestrator: Arc<LifecycleOrchestrator>,
    provider: Arc<dyn GenerationProvider>,
    resources: Option<Arc<dyn ResourceApi>>,
    classifier: IntentClassifier,
    chat: RwLock<ChatSession>,
    blueprints: RwLock<BlueprintStore>,
    in_flight: Mutex<()>,
    greeting: String,
    request_timeout: Option<Duration>,
}

impl DashboardController {
    /// Creates a controller with the default classifier and greeting.
    pub fn new(
        orchestrator: Arc<LifecycleOrchestrator>,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            orchestrator,
            provider,
            resources: None,
            classifier: IntentClassifier::default(),
            chat: RwLock::new(ChatSession::with_greeting(DEFAULT_GREETING)),
            blueprints: RwLock::new(BlueprintStore::new()),
            in_flight: Mutex::new(()),
            greeting: DEFAULT_GREETING.to_string(),
            request_timeout: None,
        }
    }

    /// Bootstraps a dashboard session from configuration and seed projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed data cannot be registered.
    pub async fn from_config(
        config: &StudioConfig,
        provider: Arc<dyn GenerationProvider>,
    ) -> Result<Self> {
        let orchestrator =
            LifecycleOrchestrator::bootstrap(config.lifecycle.clone(), seed_projects()).await?;

        tracing::info!(
            provider_mode = %provider.mode(),
            model = provider.model(),
            "Dashboard session started"
        );

        Ok(Self::new(Arc::new(orchestrator), provider)
            .with_classifier(IntentClassifier::with_triggers(&config.intent.triggers))
            .with_greeting(config.session.greeting.clone())
            .with_request_timeout(config.provider.request_timeout()))
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Bounds every provider call; an expired call is answered like any other provider failure.
    pub fn with_request_timeout(mut self, limit: Option<Duration>) -> Self {
        self.request_timeout = limit;
        self
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceApi>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Replaces the opening greeting; an empty string starts with an empty transcript.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        *self.chat.get_mut() = self.fresh_session();
        self
    }

    pub fn orchestrator(&self) -> &Arc<LifecycleOrchestrator> {
        &self.orchestrator
    }

    fn fresh_session(&self) -> ChatSession {
        if self.greeting.trim().is_empty() {
            ChatSession::new()
        } else {
            ChatSession::with_greeting(&self.greeting)
        }
    }

    // ============================================================================
    // Chat
    // ============================================================================

    /// Processes one user message end to end.
    ///
    /// The user message is appended first. Provider and decode failures are
    /// recovered into an assistant message, so every accepted call ends with
    /// exactly two new transcript entries.
    ///
    /// # Errors
    ///
    /// - `EmptyMessage` for blank input (nothing is appended)
    /// - `Busy` if another message is still being processed
    pub async fn handle_user_message(&self, text: &str) -> Result<MessageOutcome> {
        if text.trim().is_empty() {
            return Err(StudioError::EmptyMessage);
        }
        let _flight = self.in_flight.try_lock().map_err(|_| StudioError::Busy)?;

        let (intent, history) = {
            let mut chat = self.chat.write().await;
            let history = chat.turns();
            chat.append(MessageRole::User, text);
            let blueprint_exists = self.blueprints.read().await.is_set();
            (self.classifier.classify(text, blueprint_exists), history)
        };
        tracing::debug!(?intent, "Classified user message");

        let (status, content) = match intent {
            Intent::BlueprintRequest => self.generate_blueprint(text).await,
            Intent::ChatRequest => self.generate_chat(text, history).await,
        };

        let reply = self
            .chat
            .write()
            .await
            .append(MessageRole::Assistant, content)
            .clone();

        Ok(MessageOutcome {
            intent,
            status,
            reply,
        })
    }

    async fn generate(&self, request: GenerationRequest) -> std::result::Result<String, ProviderError> {
        let call = self.provider.generate(request);
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ProviderError::Timeout(limit.as_secs()))),
            None => call.await,
        }
    }

    async fn generate_blueprint(&self, prompt: &str) -> (ReplyStatus, String) {
        let raw = match self.generate(GenerationRequest::blueprint(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Blueprint generation failed");
                return (ReplyStatus::ProviderFailed, e.to_string());
            }
        };

        match Blueprint::decode(&raw) {
            Ok(blueprint) => {
                let summary = blueprint.summary().to_string();
                let app_name = blueprint.app_name.clone();
                if let Err(e) = self.blueprints.write().await.try_set(blueprint) {
                    tracing::warn!(error = %e, "Discarding generated blueprint");
                } else {
                    tracing::info!(%app_name, "Blueprint stored");
                }
                (ReplyStatus::BlueprintStored, summary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Provider text is not a blueprint, showing it verbatim");
                (ReplyStatus::RawFallback, raw)
            }
        }
    }

    async fn generate_chat(&self, prompt: &str, history: Vec<HistoryTurn>) -> (ReplyStatus, String) {
        match self.generate(GenerationRequest::chat(prompt, history)).await {
            Ok(answer) => (ReplyStatus::Answered, answer),
            Err(e) => {
                tracing::warn!(error = %e, "Chat generation failed");
                (ReplyStatus::ProviderFailed, e.to_string())
            }
        }
    }

    /// Clears the blueprint and restarts the transcript.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a message is being processed.
    pub async fn reset_session(&self) -> Result<()> {
        let _flight = self.in_flight.try_lock().map_err(|_| StudioError::Busy)?;
        self.blueprints.write().await.clear();
        *self.chat.write().await = self.fresh_session();
        tracing::info!("Session reset");
        Ok(())
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.chat.read().await.history()
    }

    pub async fn blueprint(&self) -> Option<Blueprint> {
        self.blueprints.read().await.current().cloned()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    // ============================================================================
    // Deploys
    // ============================================================================

    pub async fn request_deploy(&self, project_id: &str) -> Result<DeployRequest> {
        self.orchestrator.request_deploy(project_id).await
    }

    pub async fn confirm_deploy(&self, request_id: &str) -> Result<DeployRequest> {
        self.orchestrator.confirm_deploy(request_id).await
    }

    pub async fn cancel_deploy(&self, request_id: &str) -> Result<DeployRequest> {
        self.orchestrator.cancel_deploy(request_id).await
    }

    pub async fn remove_project(&self, project_id: &str) -> Result<Project> {
        self.orchestrator.remove_project(project_id).await
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.orchestrator.projects().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.orchestrator.subscribe()
    }

    // ============================================================================
    // Backend
    // ============================================================================

    /// Installs a marketplace module in the background.
    ///
    /// The outcome is logged; the returned handle may be awaited or dropped.
    ///
    /// # Errors
    ///
    /// Returns a config error if no backend API was configured.
    pub fn install_module(&self, module_id: &str) -> Result<JoinHandle<Result<Value>>> {
        let resources = self
            .resources
            .clone()
            .ok_or_else(|| StudioError::config("No backend API configured"))?;
        let module_id = module_id.to_string();

        Ok(tokio::spawn(async move {
            let result = resources.install_module(&module_id).await;
            match &result {
                Ok(_) => tracing::info!(%module_id, "Module installed"),
                Err(e) => tracing::warn!(%module_id, error = %e, "Module install failed"),
            }
            result
        }))
    }

    /// Read-only view of the whole dashboard.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            projects: self.orchestrator.projects().await,
            pending_deploys: self.orchestrator.pending_requests().await,
            messages: self.history().await,
            blueprint: self.blueprint().await,
            processing: self.is_processing(),
            provider_mode: self.provider.mode(),
        }
    }
}
