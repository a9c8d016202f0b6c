use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use shared::{
    domain::{Event, EventId},
    protocol::EventWrite,
};
use tokio::sync::{oneshot, Mutex};

use crate::{error::ServiceError, service::EventService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    NotFound,
    Server,
}

/// In-memory backend recording every call it receives.
#[derive(Default)]
pub struct FakeEventService {
    events: Mutex<Vec<Event>>,
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<FakeFailure>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    next_id: AtomicU64,
}

impl FakeEventService {
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Mutex::new(events),
            next_id: AtomicU64::new(100),
            ..Self::default()
        }
    }

    pub async fn fail_next(&self, failure: FakeFailure) {
        *self.fail_next.lock().await = Some(failure);
    }

    /// Holds the next call until the returned sender fires or is dropped.
    pub async fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().await = Some(rx);
        tx
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn stored(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    async fn enter(&self, call: String, target: Option<&EventId>) -> Result<(), ServiceError> {
        self.calls.lock().await.push(call);

        let gate = self.gate.lock().await.take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        match self.fail_next.lock().await.take() {
            Some(FakeFailure::NotFound) => Err(ServiceError::NotFound {
                id: target.cloned().unwrap_or_else(|| EventId::new("?")),
            }),
            Some(FakeFailure::Server) => Err(ServiceError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EventService for FakeEventService {
    async fn list_events(&self) -> Result<Vec<Event>, ServiceError> {
        self.enter("list".into(), None).await?;
        Ok(self.events.lock().await.clone())
    }

    async fn get_event(&self, id: &EventId) -> Result<Event, ServiceError> {
        self.enter(format!("get {id}"), Some(id)).await?;
        self.events
            .lock()
            .await
            .iter()
            .find(|event| &event.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound { id: id.clone() })
    }

    async fn create_event(&self, event: &EventWrite) -> Result<Event, ServiceError> {
        self.enter("create".into(), None).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Event {
            id: EventId::new(id.to_string()),
            title: event.title.clone(),
            date: event.date,
            location: event.location.clone(),
        };
        self.events.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: &EventId, event: &EventWrite) -> Result<Event, ServiceError> {
        self.enter(format!("update {id}"), Some(id)).await?;
        let mut events = self.events.lock().await;
        let stored = events
            .iter_mut()
            .find(|stored| &stored.id == id)
            .ok_or_else(|| ServiceError::NotFound { id: id.clone() })?;
        stored.title = event.title.clone();
        stored.date = event.date;
        stored.location = event.location.clone();
        Ok(stored.clone())
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), ServiceError> {
        self.enter(format!("delete {id}"), Some(id)).await?;
        let mut events = self.events.lock().await;
        let before = events.len();
        events.retain(|event| &event.id != id);
        if events.len() == before {
            return Err(ServiceError::NotFound { id: id.clone() });
        }
        Ok(())
    }
}

pub fn event(id: &str, title: &str, date: (i32, u32, u32), location: &str) -> Event {
    Event {
        id: EventId::new(id),
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date"),
        location: location.to_string(),
    }
}
