use super::*;
use studio_core::project::seed_projects;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::{sleep, timeout};

const ACK: Duration = Duration::from_millis(1500);
const BUILD: Duration = Duration::from_millis(5000);
const TICK: Duration = Duration::from_millis(1);

async fn seeded() -> LifecycleOrchestrator {
    LifecycleOrchestrator::bootstrap(LifecycleSettings::default(), seed_projects())
        .await
        .unwrap()
}

fn drain(rx: &mut broadcast::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
    events
}

fn for_project(events: &[LifecycleEvent], project_id: &str) -> Vec<ProjectStatus> {
    events
        .iter()
        .filter(|e| e.project_id == project_id)
        .map(|e| e.to)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_full_deploy_cycle() {
    let orchestrator = seeded().await;
    let mut rx = orchestrator.subscribe();
    let before = orchestrator.project("1").await.unwrap();

    let request = orchestrator.request_deploy("1").await.unwrap();
    assert!(request.is_pending());
    let confirmed = orchestrator.confirm_deploy(&request.id).await.unwrap();
    assert_eq!(confirmed.state, DeployState::Confirmed);

    // Confirm returns before the acknowledgement delay elapses
    assert_eq!(orchestrator.project("1").await.unwrap(), before);

    sleep(ACK + TICK).await;
    let building = orchestrator.project("1").await.unwrap();
    assert_eq!(building.status, ProjectStatus::Building);
    assert_ne!(building.last_updated, before.last_updated);

    sleep(BUILD).await;
    let active = orchestrator.project("1").await.unwrap();
    assert_eq!(active.status, ProjectStatus::Active);
    assert_eq!(active.compliance_score, before.compliance_score);
    assert_eq!(active.tech_stack, before.tech_stack);

    let events = drain(&mut rx);
    assert_eq!(
        for_project(&events, "1"),
        vec![ProjectStatus::Building, ProjectStatus::Active]
    );
    assert_eq!(events.iter().filter(|e| e.project_id == "1").last().unwrap().at, active.last_updated);
}

#[tokio::test(start_paused = true)]
async fn test_confirm_while_building_is_rejected() {
    let orchestrator = seeded().await;
    let before = orchestrator.project("2").await.unwrap();
    assert_eq!(before.status, ProjectStatus::Building);

    let request = orchestrator.request_deploy("2").await.unwrap();
    let err = orchestrator.confirm_deploy(&request.id).await.unwrap_err();

    assert_eq!(err, StudioError::AlreadyDeploying("2".to_string()));
    assert_eq!(orchestrator.project("2").await.unwrap(), before);
    assert!(orchestrator.request(&request.id).await.unwrap().is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_double_confirm_transitions_once() {
    let orchestrator = seeded().await;
    let mut rx = orchestrator.subscribe();

    let request = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&request.id).await.unwrap();
    let err = orchestrator.confirm_deploy(&request.id).await.unwrap_err();
    assert!(err.is_already_deploying());

    sleep(ACK + BUILD + TICK).await;

    let events = drain(&mut rx);
    assert_eq!(
        for_project(&events, "1"),
        vec![ProjectStatus::Building, ProjectStatus::Active]
    );
}

#[tokio::test(start_paused = true)]
async fn test_second_request_for_same_project_is_not_queued() {
    let orchestrator = seeded().await;

    let first = orchestrator.request_deploy("1").await.unwrap();
    let second = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&first.id).await.unwrap();

    let err = orchestrator.confirm_deploy(&second.id).await.unwrap_err();
    assert!(err.is_already_deploying());
    assert!(orchestrator.request(&second.id).await.unwrap().is_pending());

    // Once the first cycle completes the second request can go through
    sleep(ACK + BUILD + TICK).await;
    orchestrator.confirm_deploy(&second.id).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancel_confirmed_request_fails() {
    let orchestrator = seeded().await;
    let request = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&request.id).await.unwrap();

    let err = orchestrator.cancel_deploy(&request.id).await.unwrap_err();
    assert!(err.is_invalid_state());

    // Still invalid once the cycle has finished
    sleep(ACK + BUILD + TICK).await;
    let err = orchestrator.cancel_deploy(&request.id).await.unwrap_err();
    assert!(err.is_invalid_state());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_request_cannot_be_confirmed() {
    let orchestrator = seeded().await;
    let mut rx = orchestrator.subscribe();
    let request = orchestrator.request_deploy("3").await.unwrap();

    let cancelled = orchestrator.cancel_deploy(&request.id).await.unwrap();
    assert_eq!(cancelled.state, DeployState::Cancelled);
    assert!(orchestrator.pending_requests().await.is_empty());

    let err = orchestrator.confirm_deploy(&request.id).await.unwrap_err();
    assert!(err.is_invalid_state());

    sleep(ACK + BUILD + TICK).await;
    assert!(for_project(&drain(&mut rx), "3").is_empty());
    assert_eq!(
        orchestrator.project("3").await.unwrap().status,
        ProjectStatus::ComplianceCheck
    );
}

#[tokio::test(start_paused = true)]
async fn test_completed_request_cannot_be_reconfirmed() {
    let orchestrator = seeded().await;
    let request = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&request.id).await.unwrap();
    sleep(ACK + BUILD + TICK).await;

    let err = orchestrator.confirm_deploy(&request.id).await.unwrap_err();
    assert!(err.is_invalid_state());
}

#[tokio::test]
async fn test_unknown_ids() {
    let orchestrator = seeded().await;

    let err = orchestrator.request_deploy("missing").await.unwrap_err();
    assert!(err.is_unknown_project());

    let err = orchestrator.confirm_deploy("never-issued").await.unwrap_err();
    assert_eq!(
        err,
        StudioError::UnknownDeployRequest("never-issued".to_string())
    );
    let err = orchestrator.cancel_deploy("never-issued").await.unwrap_err();
    assert!(matches!(err, StudioError::UnknownDeployRequest(_)));
}

#[tokio::test(start_paused = true)]
async fn test_remove_project_cancels_continuation() {
    let orchestrator = seeded().await;
    let mut rx = orchestrator.subscribe();

    let request = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&request.id).await.unwrap();
    let removed = orchestrator.remove_project("1").await.unwrap();
    assert_eq!(removed.name, "pilot-bank-core");

    sleep(ACK + BUILD + TICK).await;

    assert!(for_project(&drain(&mut rx), "1").is_empty());
    assert!(orchestrator.project("1").await.is_none());
    assert!(orchestrator.remove_project("1").await.unwrap_err().is_unknown_project());
}

#[tokio::test(start_paused = true)]
async fn test_remove_during_build_cancels_completion() {
    let orchestrator = seeded().await;
    let mut rx = orchestrator.subscribe();

    let request = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&request.id).await.unwrap();
    sleep(ACK + TICK).await;
    orchestrator.remove_project("1").await.unwrap();
    sleep(BUILD).await;

    assert_eq!(
        for_project(&drain(&mut rx), "1"),
        vec![ProjectStatus::Building]
    );
}

#[tokio::test(start_paused = true)]
async fn test_readded_project_ignores_old_cycle() {
    let orchestrator = seeded().await;
    let request = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&request.id).await.unwrap();

    let removed = orchestrator.remove_project("1").await.unwrap();
    orchestrator.add_project(removed.clone()).await.unwrap();
    sleep(ACK + BUILD + TICK).await;

    assert_eq!(orchestrator.project("1").await.unwrap(), removed);
}

#[tokio::test(start_paused = true)]
async fn test_projects_deploy_independently() {
    let orchestrator = seeded().await;

    let first = orchestrator.request_deploy("1").await.unwrap();
    orchestrator.confirm_deploy(&first.id).await.unwrap();
    sleep(Duration::from_millis(1000)).await;
    let third = orchestrator.request_deploy("3").await.unwrap();
    orchestrator.confirm_deploy(&third.id).await.unwrap();

    // Project 1 is building, project 3 not yet acknowledged
    sleep(Duration::from_millis(600)).await;
    assert_eq!(orchestrator.project("1").await.unwrap().status, ProjectStatus::Building);
    assert_eq!(
        orchestrator.project("3").await.unwrap().status,
        ProjectStatus::ComplianceCheck
    );

    sleep(ACK + BUILD).await;
    assert_eq!(orchestrator.project("1").await.unwrap().status, ProjectStatus::Active);
    assert_eq!(orchestrator.project("3").await.unwrap().status, ProjectStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_build_completes_on_its_own() {
    let orchestrator = seeded().await;
    assert_eq!(orchestrator.project("2").await.unwrap().status, ProjectStatus::Building);

    sleep(BUILD + TICK).await;
    assert_eq!(orchestrator.project("2").await.unwrap().status, ProjectStatus::Active);
}

#[tokio::test]
async fn test_projects_keep_registration_order() {
    let orchestrator = seeded().await;
    let names: Vec<_> = orchestrator
        .projects()
        .await
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(
        names,
        vec!["pilot-bank-core", "teos-commerce-v1", "internal-audit-log"]
    );

    let err = orchestrator
        .add_project(seed_projects().remove(0))
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::Internal(_)));
}

#[tokio::test(start_paused = true)]
async fn test_confirm_waiting_on_one_project_does_not_block_others() {
    let orchestrator = Arc::new(seeded().await);
    let first = orchestrator.request_deploy("1").await.unwrap();
    let other = orchestrator.request_deploy("3").await.unwrap();

    // Hold project 1 so its confirm has to wait for the slot
    let slot = orchestrator.slot("1").await.unwrap();
    let held = slot.lock().await;

    let confirm = {
        let orchestrator = orchestrator.clone();
        let request_id = first.id.clone();
        tokio::spawn(async move { orchestrator.confirm_deploy(&request_id).await })
    };
    tokio::task::yield_now().await;

    let cancelled = timeout(Duration::from_secs(1), orchestrator.cancel_deploy(&other.id))
        .await
        .expect("cancel on project 3 waited for project 1")
        .unwrap();
    assert_eq!(cancelled.state, DeployState::Cancelled);
    let extra = timeout(Duration::from_secs(1), orchestrator.request_deploy("3"))
        .await
        .expect("request on project 3 waited for project 1")
        .unwrap();
    assert!(extra.is_pending());

    drop(held);
    let confirmed = confirm.await.unwrap().unwrap();
    assert_eq!(confirmed.state, DeployState::Confirmed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_confirm_waits_wins() {
    let orchestrator = Arc::new(seeded().await);
    let request = orchestrator.request_deploy("1").await.unwrap();

    let slot = orchestrator.slot("1").await.unwrap();
    let held = slot.lock().await;

    let confirm = {
        let orchestrator = orchestrator.clone();
        let request_id = request.id.clone();
        tokio::spawn(async move { orchestrator.confirm_deploy(&request_id).await })
    };
    tokio::task::yield_now().await;

    orchestrator.cancel_deploy(&request.id).await.unwrap();
    drop(held);

    let err = confirm.await.unwrap().unwrap_err();
    assert!(err.is_invalid_state());
    sleep(ACK + BUILD + TICK).await;
    let project = orchestrator.project("1").await.unwrap();
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.last_updated, "2h ago");
}
