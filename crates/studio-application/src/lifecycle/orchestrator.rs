use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use studio_core::config::LifecycleSettings;
use studio_core::error::{Result, StudioError};
use studio_core::project::{DeployRequest, DeployState, LifecycleEvent, Project, ProjectStatus};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 64;

/// Per-project state guarded by its own lock.
struct ProjectSlot {
    project: Project,
    /// Token of the deploy cycle currently driving this project, if any
    cycle_id: Option<String>,
    /// Timer task of that cycle
    continuation: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Registry {
    /// Insertion order for snapshots
    order: Vec<String>,
    slots: HashMap<String, Arc<Mutex<ProjectSlot>>>,
}

struct Inner {
    registry: RwLock<Registry>,
    requests: Mutex<HashMap<String, DeployRequest>>,
    events: broadcast::Sender<LifecycleEvent>,
    settings: LifecycleSettings,
}

/// Owns the project registry and drives deploy cycles.
///
/// `LifecycleOrchestrator` is responsible for:
/// - Creating, confirming and cancelling deploy requests
/// - Moving a confirmed project to `Building` after the acknowledgement delay
/// - Completing the build (`Active`) after the build delay, unsupervised
/// - Cancelling pending timers when a project is removed
///
/// Operations on one project are serialized through that project's lock;
/// different projects proceed independently. Timer tasks only hold a weak
/// reference, so dropping the orchestrator stops every pending continuation.
pub struct LifecycleOrchestrator {
    inner: Arc<Inner>,
}

impl LifecycleOrchestrator {
    /// Creates an orchestrator with an empty registry.
    pub fn new(settings: LifecycleSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::default()),
                requests: Mutex::new(HashMap::new()),
                events,
                settings,
            }),
        }
    }

    /// Creates an orchestrator and registers the given seed projects.
    ///
    /// Must run inside a tokio runtime: seed projects that are already
    /// `Building` get their build-completion timer scheduled.
    ///
    /// # Errors
    ///
    /// Returns an error if two seed projects share an id.
    pub async fn bootstrap(settings: LifecycleSettings, projects: Vec<Project>) -> Result<Self> {
        let orchestrator = Self::new(settings);
        for project in projects {
            orchestrator.add_project(project).await?;
        }
        Ok(orchestrator)
    }

    /// Subscribes to status transition events.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.inner.events.subscribe()
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.inner.settings
    }

    /// Registers a project.
    ///
    /// # Errors
    ///
    /// Returns an error if a project with the same id is already registered.
    pub async fn add_project(&self, project: Project) -> Result<()> {
        let id = project.id.clone();
        let building = project.is_building();

        let slot = Arc::new(Mutex::new(ProjectSlot {
            project,
            cycle_id: None,
            continuation: None,
        }));

        {
            let mut registry = self.inner.registry.write().await;
            if registry.slots.contains_key(&id) {
                return Err(StudioError::internal(format!(
                    "Project '{id}' is already registered"
                )));
            }
            registry.order.push(id.clone());
            registry.slots.insert(id.clone(), slot.clone());
        }

        if building {
            // A build already running at bootstrap still completes on its own
            let cycle_id = format!("seed-{id}");
            let mut guard = slot.lock().await;
            guard.cycle_id = Some(cycle_id.clone());
            guard.continuation = Some(self.spawn_cycle(id.clone(), cycle_id, None));
            tracing::info!(project_id = %id, "Scheduled completion for seeded build");
        }

        Ok(())
    }

    /// Removes a project and cancels any pending timer for it.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::UnknownProject` if the id is not registered.
    pub async fn remove_project(&self, project_id: &str) -> Result<Project> {
        let slot = {
            let mut registry = self.inner.registry.write().await;
            let slot = registry
                .slots
                .remove(project_id)
                .ok_or_else(|| StudioError::UnknownProject(project_id.to_string()))?;
            registry.order.retain(|id| id != project_id);
            slot
        };

        let mut slot = slot.lock().await;
        if let Some(handle) = slot.continuation.take() {
            handle.abort();
            tracing::info!(project_id, "Cancelled pending deploy continuation");
        }
        slot.cycle_id = None;
        Ok(slot.project.clone())
    }

    /// Returns a snapshot of one project.
    pub async fn project(&self, project_id: &str) -> Option<Project> {
        let slot = self.slot(project_id).await?;
        let slot = slot.lock().await;
        Some(slot.project.clone())
    }

    /// Returns snapshots of all projects in registration order.
    pub async fn projects(&self) -> Vec<Project> {
        let slots: Vec<_> = {
            let registry = self.inner.registry.read().await;
            registry
                .order
                .iter()
                .filter_map(|id| registry.slots.get(id).cloned())
                .collect()
        };

        let mut projects = Vec::with_capacity(slots.len());
        for slot in slots {
            projects.push(slot.lock().await.project.clone());
        }
        projects
    }

    /// Returns a deploy request by id.
    pub async fn request(&self, request_id: &str) -> Option<DeployRequest> {
        self.inner.requests.lock().await.get(request_id).cloned()
    }

    /// Returns all requests still awaiting confirmation, oldest first.
    pub async fn pending_requests(&self) -> Vec<DeployRequest> {
        let requests = self.inner.requests.lock().await;
        let mut pending: Vec<_> = requests.values().filter(|r| r.is_pending()).cloned().collect();
        pending.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        pending
    }

    /// Creates a pending deploy request. The project is not touched.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::UnknownProject` if the id is not registered.
    pub async fn request_deploy(&self, project_id: &str) -> Result<DeployRequest> {
        if self.slot(project_id).await.is_none() {
            return Err(StudioError::UnknownProject(project_id.to_string()));
        }

        let request = DeployRequest::new(project_id);
        self.inner
            .requests
            .lock()
            .await
            .insert(request.id.clone(), request.clone());

        tracing::info!(project_id, request_id = %request.id, "Deploy requested");
        Ok(request)
    }

    /// Confirms a pending request and starts the deploy cycle.
    ///
    /// Returns as soon as the request is marked confirmed; the transition to
    /// `Building` happens after the acknowledgement delay and is observed by
    /// later reads or through `subscribe`.
    ///
    /// # Errors
    ///
    /// - `UnknownDeployRequest` if the id was never issued
    /// - `InvalidState` if the request was cancelled or its cycle already ran
    /// - `UnknownProject` if the project was removed since the request
    /// - `AlreadyDeploying` if the project is building or has a confirmed
    ///   deploy in flight; nothing changes in that case
    pub async fn confirm_deploy(&self, request_id: &str) -> Result<DeployRequest> {
        let project_id = {
            let requests = self.inner.requests.lock().await;
            let request = requests
                .get(request_id)
                .ok_or_else(|| StudioError::UnknownDeployRequest(request_id.to_string()))?;
            if request.state == DeployState::Cancelled {
                return Err(StudioError::invalid_state(request_id, request.state, "pending"));
            }
            request.project_id.clone()
        };

        // Lock order is slot, then requests; the request table is never held
        // while waiting on a project
        let slot = self
            .slot(&project_id)
            .await
            .ok_or_else(|| StudioError::UnknownProject(project_id.clone()))?;
        let mut slot = slot.lock().await;

        if slot.project.is_building() || slot.cycle_id.is_some() {
            tracing::warn!(
                project_id = %project_id,
                request_id,
                "Rejected confirm: deploy already in progress"
            );
            return Err(StudioError::AlreadyDeploying(project_id));
        }

        let mut requests = self.inner.requests.lock().await;
        let request = requests
            .get_mut(request_id)
            .ok_or_else(|| StudioError::UnknownDeployRequest(request_id.to_string()))?;
        // Re-checked: a cancel may have landed while the slot was awaited
        if request.state != DeployState::Pending {
            return Err(StudioError::invalid_state(request_id, request.state, "pending"));
        }

        request.state = DeployState::Confirmed;
        slot.cycle_id = Some(request.id.clone());
        slot.continuation = Some(self.spawn_cycle(
            project_id.clone(),
            request.id.clone(),
            Some(self.inner.settings.ack_delay()),
        ));

        tracing::info!(project_id = %project_id, request_id, "Deploy confirmed");
        Ok(request.clone())
    }

    /// Cancels a pending request.
    ///
    /// # Errors
    ///
    /// - `UnknownDeployRequest` if the id was never issued
    /// - `InvalidState` if the request is not pending
    pub async fn cancel_deploy(&self, request_id: &str) -> Result<DeployRequest> {
        let mut requests = self.inner.requests.lock().await;
        let request = requests
            .get_mut(request_id)
            .ok_or_else(|| StudioError::UnknownDeployRequest(request_id.to_string()))?;

        if !request.is_pending() {
            return Err(StudioError::invalid_state(request_id, request.state, "pending"));
        }

        request.state = DeployState::Cancelled;
        tracing::info!(project_id = %request.project_id, request_id, "Deploy cancelled");
        Ok(request.clone())
    }

    async fn slot(&self, project_id: &str) -> Option<Arc<Mutex<ProjectSlot>>> {
        self.inner.registry.read().await.slots.get(project_id).cloned()
    }

    fn spawn_cycle(
        &self,
        project_id: String,
        cycle_id: String,
        ack_delay: Option<Duration>,
    ) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        let build_delay = self.inner.settings.build_delay();
        tokio::spawn(run_cycle(inner, project_id, cycle_id, ack_delay, build_delay))
    }
}

/// Timer continuation of one deploy cycle.
async fn run_cycle(
    inner: Weak<Inner>,
    project_id: String,
    cycle_id: String,
    ack_delay: Option<Duration>,
    build_delay: Duration,
) {
    if let Some(delay) = ack_delay {
        tokio::time::sleep(delay).await;
        let Some(strong) = inner.upgrade() else {
            return;
        };
        if !strong
            .transition(&project_id, &cycle_id, ProjectStatus::Building)
            .await
        {
            return;
        }
    }

    tokio::time::sleep(build_delay).await;
    if let Some(strong) = inner.upgrade() {
        strong
            .transition(&project_id, &cycle_id, ProjectStatus::Active)
            .await;
    }
}

impl Inner {
    /// Applies a timed transition if the cycle still owns the project.
    ///
    /// Returns false when the project was removed or the cycle is stale.
    async fn transition(&self, project_id: &str, cycle_id: &str, to: ProjectStatus) -> bool {
        let Some(slot) = self.registry.read().await.slots.get(project_id).cloned() else {
            tracing::debug!(project_id, "Project removed, dropping continuation");
            return false;
        };

        let mut slot = slot.lock().await;
        if slot.cycle_id.as_deref() != Some(cycle_id) {
            tracing::debug!(project_id, cycle_id, "Stale continuation ignored");
            return false;
        }

        let from = slot.project.status;
        let at = chrono::Utc::now().to_rfc3339();
        slot.project.status = to;
        slot.project.last_updated = at.clone();

        if to == ProjectStatus::Active {
            slot.cycle_id = None;
            // This task is the continuation; dropping its handle detaches it
            slot.continuation = None;
        }

        tracing::info!(project_id, %from, %to, "Project status changed");
        // No subscribers is fine
        let _ = self.events.send(LifecycleEvent {
            project_id: project_id.to_string(),
            from,
            to,
            at,
        });
        true
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
