use super::*;
use crate::test_support::{event, FakeEventService, FakeFailure};

fn sample_events() -> Vec<Event> {
    vec![
        event("1", "Tournoi", (2025, 3, 31), "Stade"),
        event("2", "Marathon", (2025, 1, 12), "Paris"),
        event("3", "Finale", (2025, 6, 1), "Arena"),
    ]
}

fn controller_with(service: Arc<FakeEventService>) -> EventListController {
    EventListController::new(service, Navigator::new())
}

#[test]
fn reducer_removes_deleted_event_by_id_and_keeps_order() {
    let mut state = ListState::default();
    state.apply(ListAction::FetchSucceeded(sample_events()));
    state.apply(ListAction::DeleteRequested(sample_events()[1].clone()));
    state.apply(ListAction::DeleteStarted);
    state.apply(ListAction::DeleteSucceeded(EventId::new("2")));

    let ids: Vec<_> = state.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert!(!state.is_confirming_delete());
    assert!(!state.deleting);
}

#[test]
fn reducer_keeps_collection_and_phase_while_confirming() {
    let mut state = ListState::default();
    state.apply(ListAction::FetchSucceeded(sample_events()));
    let before = state.events.clone();

    state.apply(ListAction::DeleteRequested(sample_events()[0].clone()));

    assert_eq!(state.phase, ListPhase::Ready);
    assert_eq!(state.events, before);
    assert_eq!(
        state.pending_delete.as_ref().map(|e| e.id.as_str()),
        Some("1")
    );
}

#[test]
fn reducer_ignores_cancel_while_delete_in_flight() {
    let mut state = ListState::default();
    state.apply(ListAction::FetchSucceeded(sample_events()));
    state.apply(ListAction::DeleteRequested(sample_events()[0].clone()));
    state.apply(ListAction::DeleteStarted);
    state.apply(ListAction::DeleteCancelled);

    assert!(state.is_confirming_delete());
}

#[tokio::test]
async fn mount_loads_events_in_backend_order() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());

    assert_eq!(controller.snapshot().await.phase, ListPhase::Loading);
    controller.mount().await;

    let state = controller.snapshot().await;
    assert!(state.is_ready());
    let titles: Vec<_> = state.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Tournoi", "Marathon", "Finale"]);
    assert_eq!(service.calls().await, vec!["list"]);
}

#[tokio::test]
async fn failed_load_exposes_message_and_retry_recovers() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    service.fail_next(FakeFailure::Server).await;
    let controller = controller_with(service.clone());

    controller.mount().await;
    assert_eq!(
        controller.snapshot().await.phase,
        ListPhase::Failed {
            message: "could not load events".into()
        }
    );

    assert!(controller.retry().await);
    let state = controller.snapshot().await;
    assert!(state.is_ready());
    assert_eq!(state.events.len(), 3);
    assert_eq!(service.calls().await, vec!["list", "list"]);
}

#[tokio::test]
async fn retry_is_refused_unless_failed() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());
    controller.mount().await;

    assert!(!controller.retry().await);
    assert_eq!(service.calls().await, vec!["list"]);
}

#[tokio::test]
async fn confirmed_delete_removes_event_without_refetch() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());
    controller.mount().await;

    assert!(controller.request_delete(&EventId::new("1")).await);
    assert!(controller.confirm_delete().await);

    let state = controller.snapshot().await;
    assert!(state.find(&EventId::new("1")).is_none());
    assert_eq!(state.events.len(), 2);
    assert!(state.pending_delete.is_none());
    assert_eq!(service.calls().await, vec!["list", "delete 1"]);
}

#[tokio::test]
async fn cancel_delete_never_calls_backend() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());
    controller.mount().await;

    assert!(controller.request_delete(&EventId::new("2")).await);
    controller.cancel_delete().await;

    let state = controller.snapshot().await;
    assert!(!state.is_confirming_delete());
    assert_eq!(state.events.len(), 3);
    assert!(!controller.confirm_delete().await);
    assert_eq!(service.calls().await, vec!["list"]);
}

#[tokio::test]
async fn failed_delete_clears_pending_and_keeps_collection() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());
    controller.mount().await;
    let before = controller.snapshot().await.events;

    service.fail_next(FakeFailure::Server).await;
    assert!(controller.request_delete(&EventId::new("3")).await);
    assert!(!controller.confirm_delete().await);

    let state = controller.snapshot().await;
    assert_eq!(state.events, before);
    assert!(state.pending_delete.is_none());
    assert_eq!(state.phase, ListPhase::Ready);
    assert_eq!(state.notice.as_deref(), Some("could not delete event"));
}

#[tokio::test]
async fn deleting_already_deleted_event_reports_not_found() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());
    controller.mount().await;

    // Another client removed the event after our list was fetched.
    service
        .delete_event(&EventId::new("2"))
        .await
        .expect("first delete");
    let err = service
        .delete_event(&EventId::new("2"))
        .await
        .expect_err("second delete");
    assert!(err.is_not_found());

    assert!(controller.request_delete(&EventId::new("2")).await);
    assert!(!controller.confirm_delete().await);

    let state = controller.snapshot().await;
    assert_eq!(state.events.len(), 3);
    assert_eq!(state.notice.as_deref(), Some("event no longer exists"));
}

#[tokio::test]
async fn request_delete_for_unknown_event_is_refused() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service);
    controller.mount().await;

    assert!(!controller.request_delete(&EventId::new("404")).await);
    assert!(!controller.snapshot().await.is_confirming_delete());
}

#[tokio::test]
async fn response_after_unmount_is_ignored() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let release = service.hold_next().await;
    let controller = controller_with(service.clone());

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.mount().await }
    });
    while service.calls().await.is_empty() {
        tokio::task::yield_now().await;
    }

    controller.unmount().await;
    let _ = release.send(());
    pending.await.expect("mount task");

    let state = controller.snapshot().await;
    assert_eq!(state.phase, ListPhase::Loading);
    assert!(state.events.is_empty());
}

#[tokio::test]
async fn editor_and_creator_emit_routes() {
    let navigator = Navigator::new();
    let mut routes = navigator.subscribe();
    let controller = EventListController::new(
        Arc::new(FakeEventService::with_events(sample_events())),
        navigator,
    );

    controller.open_editor(&EventId::new("1"));
    controller.open_creator();

    assert_eq!(
        routes.recv().await.expect("route"),
        Route::EditEvent(EventId::new("1"))
    );
    assert_eq!(routes.recv().await.expect("route"), Route::NewEvent);
}

#[tokio::test]
async fn delete_response_after_unmount_leaves_collection() {
    let service = Arc::new(FakeEventService::with_events(sample_events()));
    let controller = controller_with(service.clone());
    controller.mount().await;
    assert!(controller.request_delete(&EventId::new("1")).await);

    let release = service.hold_next().await;
    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.confirm_delete().await }
    });
    while service.calls().await.len() < 2 {
        tokio::task::yield_now().await;
    }

    controller.unmount().await;
    let _ = release.send(());
    assert!(!pending.await.expect("delete task"));

    let state = controller.snapshot().await;
    assert_eq!(state.events, sample_events());
    assert!(state.notice.is_none());
    assert_eq!(service.calls().await, vec!["list", "delete 1"]);
}

#[test]
fn refetch_drops_stale_delete_candidate() {
    let mut state = ListState::default();
    state.apply(ListAction::FetchSucceeded(sample_events()));
    state.apply(ListAction::DeleteRequested(sample_events()[2].clone()));

    state.apply(ListAction::FetchStarted);
    state.apply(ListAction::FetchSucceeded(sample_events()[..2].to_vec()));

    assert!(!state.is_confirming_delete());
    assert_eq!(state.events.len(), 2);
}
