//! State and orchestration for the event list screen.

use std::sync::Arc;

use shared::domain::{Event, EventId};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::Operation,
    navigation::{Navigator, Route},
    service::EventService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Ready,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub phase: ListPhase,
    /// Backend order, never re-sorted locally.
    pub events: Vec<Event>,
    /// Candidate awaiting delete confirmation.
    pub pending_delete: Option<Event>,
    pub deleting: bool,
    /// Last delete failure, shown alongside the list.
    pub notice: Option<String>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            phase: ListPhase::Loading,
            events: Vec::new(),
            pending_delete: None,
            deleting: false,
            notice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    FetchStarted,
    FetchSucceeded(Vec<Event>),
    FetchFailed(String),
    DeleteRequested(Event),
    DeleteCancelled,
    DeleteStarted,
    DeleteSucceeded(EventId),
    DeleteFailed(String),
}

impl ListState {
    pub fn apply(&mut self, action: ListAction) {
        match action {
            ListAction::FetchStarted => {
                self.phase = ListPhase::Loading;
                self.pending_delete = None;
                self.notice = None;
            }
            ListAction::FetchSucceeded(events) => {
                self.events = events;
                self.phase = ListPhase::Ready;
            }
            ListAction::FetchFailed(message) => {
                self.phase = ListPhase::Failed { message };
            }
            ListAction::DeleteRequested(event) => {
                if !self.deleting {
                    self.pending_delete = Some(event);
                }
            }
            ListAction::DeleteCancelled => {
                if !self.deleting {
                    self.pending_delete = None;
                }
            }
            ListAction::DeleteStarted => {
                self.deleting = true;
                self.notice = None;
            }
            ListAction::DeleteSucceeded(id) => {
                self.events.retain(|event| event.id != id);
                self.pending_delete = None;
                self.deleting = false;
            }
            ListAction::DeleteFailed(message) => {
                self.pending_delete = None;
                self.deleting = false;
                self.notice = Some(message);
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ListPhase::Ready
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.pending_delete.is_some()
    }

    pub fn find(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }
}

struct ListInner {
    state: ListState,
    mounted: bool,
    in_flight: bool,
}

/// Owns the list screen's collection. Cloning yields another handle to the same screen.
#[derive(Clone)]
pub struct EventListController {
    service: Arc<dyn EventService>,
    navigator: Navigator,
    inner: Arc<Mutex<ListInner>>,
}

impl EventListController {
    pub fn new(service: Arc<dyn EventService>, navigator: Navigator) -> Self {
        Self {
            service,
            navigator,
            inner: Arc::new(Mutex::new(ListInner {
                state: ListState::default(),
                mounted: true,
                in_flight: false,
            })),
        }
    }

    pub async fn snapshot(&self) -> ListState {
        self.inner.lock().await.state.clone()
    }

    /// Initial fetch when the screen is shown.
    pub async fn mount(&self) {
        self.fetch().await;
    }

    /// Re-runs the fetch; only meaningful after a failed load.
    pub async fn retry(&self) -> bool {
        {
            let inner = self.inner.lock().await;
            if !matches!(inner.state.phase, ListPhase::Failed { .. }) {
                return false;
            }
        }
        self.fetch().await;
        true
    }

    async fn fetch(&self) {
        {
            let mut inner = self.inner.lock().await;
            if !inner.mounted || inner.in_flight {
                debug!("events: list fetch skipped, screen busy or torn down");
                return;
            }
            inner.in_flight = true;
            inner.state.apply(ListAction::FetchStarted);
        }

        let result = self.service.list_events().await;

        let mut inner = self.inner.lock().await;
        inner.in_flight = false;
        if !inner.mounted {
            debug!("events: list response arrived after teardown; ignored");
            return;
        }

        match result {
            Ok(events) => {
                info!(count = events.len(), "events: list ready");
                inner.state.apply(ListAction::FetchSucceeded(events));
            }
            Err(err) => {
                let message = err.user_message(Operation::ListEvents);
                warn!(error = %err, "events: list load failed");
                inner.state.apply(ListAction::FetchFailed(message));
            }
        }
    }

    /// Opens the delete confirmation for `id`. Returns false when the event is not listed.
    pub async fn request_delete(&self, id: &EventId) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.mounted || inner.in_flight {
            return false;
        }
        let Some(event) = inner.state.find(id).cloned() else {
            return false;
        };
        inner.state.apply(ListAction::DeleteRequested(event));
        true
    }

    pub async fn cancel_delete(&self) {
        self.inner
            .lock()
            .await
            .state
            .apply(ListAction::DeleteCancelled);
    }

    /// Deletes the pending candidate. On success the event is dropped from the local
    /// collection without re-fetching; on failure the collection is left as it was.
    pub async fn confirm_delete(&self) -> bool {
        let candidate = {
            let mut inner = self.inner.lock().await;
            if !inner.mounted || inner.in_flight {
                return false;
            }
            let Some(candidate) = inner.state.pending_delete.clone() else {
                return false;
            };
            inner.in_flight = true;
            inner.state.apply(ListAction::DeleteStarted);
            candidate
        };

        let result = self.service.delete_event(&candidate.id).await;

        let mut inner = self.inner.lock().await;
        inner.in_flight = false;
        if !inner.mounted {
            debug!(event_id = %candidate.id, "events: delete response arrived after teardown; ignored");
            return false;
        }

        match result {
            Ok(()) => {
                info!(event_id = %candidate.id, "events: removed from list");
                inner
                    .state
                    .apply(ListAction::DeleteSucceeded(candidate.id));
                true
            }
            Err(err) => {
                let message = err.user_message(Operation::DeleteEvent);
                warn!(event_id = %candidate.id, error = %err, "events: delete failed");
                inner.state.apply(ListAction::DeleteFailed(message));
                false
            }
        }
    }

    pub fn open_editor(&self, id: &EventId) {
        self.navigator.navigate(Route::EditEvent(id.clone()));
    }

    pub fn open_creator(&self) {
        self.navigator.navigate(Route::NewEvent);
    }

    /// Marks the screen torn down; responses still in flight are discarded.
    pub async fn unmount(&self) {
        self.inner.lock().await.mounted = false;
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
