//! Navigation signals emitted by controllers; front ends decide how to render them.

use std::time::Duration;

use shared::domain::EventId;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::debug;

const ROUTE_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    EventList,
    NewEvent,
    EditEvent(EventId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::EventList => "/".to_string(),
            Route::NewEvent => "/add".to_string(),
            Route::EditEvent(id) => format!("/edit/{id}"),
        }
    }
}

#[derive(Clone)]
pub struct Navigator {
    tx: broadcast::Sender<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(ROUTE_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Route> {
        self.tx.subscribe()
    }

    pub fn navigate(&self, route: Route) {
        let path = route.path();
        if self.tx.send(route).is_err() {
            debug!(path = %path, "navigation: no subscriber for route");
        } else {
            debug!(path = %path, "navigation: route emitted");
        }
    }

    /// Emits `route` after `delay` unless the returned handle is dropped first.
    pub fn schedule(&self, route: Route, delay: Duration) -> ScheduledNavigation {
        let navigator = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(route);
        });
        ScheduledNavigation { handle }
    }
}

/// Pending delayed navigation. Aborted on drop.
pub struct ScheduledNavigation {
    handle: JoinHandle<()>,
}

impl ScheduledNavigation {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledNavigation {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
