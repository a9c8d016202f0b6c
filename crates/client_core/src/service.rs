use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use shared::{
    domain::{Event, EventId},
    protocol::EventWrite,
};
use tracing::{error, info};
use url::Url;

use crate::{
    config::{parse_api_url, ClientSettings, SettingsError},
    error::{Operation, ServiceError},
    normalize::{normalize_event, normalize_event_list},
};

/// Remote store of events. Controllers only talk to the backend through this seam.
#[async_trait]
pub trait EventService: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ServiceError>;
    async fn get_event(&self, id: &EventId) -> Result<Event, ServiceError>;
    async fn create_event(&self, event: &EventWrite) -> Result<Event, ServiceError>;
    async fn update_event(&self, id: &EventId, event: &EventWrite) -> Result<Event, ServiceError>;
    async fn delete_event(&self, id: &EventId) -> Result<(), ServiceError>;
}

/// [`EventService`] over the REST endpoints under `{base_url}/events`.
#[derive(Clone)]
pub struct HttpEventService {
    http: Client,
    base_url: Url,
}

impl HttpEventService {
    pub fn new(base_url: &str) -> Result<Self, SettingsError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, SettingsError> {
        let base_url = parse_api_url(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(SettingsError::HttpClient)?;
        Self::with_client(http, &settings.api_url)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn events_url(&self) -> Url {
        self.endpoint(None)
    }

    /// Ids are opaque, so they go in as a single percent-encoded path segment.
    fn event_url(&self, id: &EventId) -> Url {
        self.endpoint(Some(id))
    }

    fn endpoint(&self, id: Option<&EventId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("events");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn list_events_inner(&self) -> Result<Vec<Event>, ServiceError> {
        let response = self.http.get(self.events_url()).send().await?;
        let payload = read_payload(response, None).await?;
        Ok(normalize_event_list(payload))
    }

    async fn get_event_inner(&self, id: &EventId) -> Result<Event, ServiceError> {
        let response = self.http.get(self.event_url(id)).send().await?;
        normalize_event(read_payload(response, Some(id)).await?)
    }

    async fn create_event_inner(&self, event: &EventWrite) -> Result<Event, ServiceError> {
        let response = self.http.post(self.events_url()).json(event).send().await?;
        normalize_event(read_payload(response, None).await?)
    }

    async fn update_event_inner(
        &self,
        id: &EventId,
        event: &EventWrite,
    ) -> Result<Event, ServiceError> {
        let response = self.http.put(self.event_url(id)).json(event).send().await?;
        normalize_event(read_payload(response, Some(id)).await?)
    }

    async fn delete_event_inner(&self, id: &EventId) -> Result<(), ServiceError> {
        let response = self.http.delete(self.event_url(id)).send().await?;
        read_payload(response, Some(id)).await?;
        Ok(())
    }
}

#[async_trait]
impl EventService for HttpEventService {
    async fn list_events(&self) -> Result<Vec<Event>, ServiceError> {
        let events = self
            .list_events_inner()
            .await
            .inspect_err(|err| log_failure(Operation::ListEvents, None, err))?;
        info!(count = events.len(), "events: list fetched");
        Ok(events)
    }

    async fn get_event(&self, id: &EventId) -> Result<Event, ServiceError> {
        self.get_event_inner(id)
            .await
            .inspect_err(|err| log_failure(Operation::GetEvent, Some(id), err))
    }

    async fn create_event(&self, event: &EventWrite) -> Result<Event, ServiceError> {
        let created = self
            .create_event_inner(event)
            .await
            .inspect_err(|err| log_failure(Operation::CreateEvent, None, err))?;
        info!(event_id = %created.id, "events: created");
        Ok(created)
    }

    async fn update_event(&self, id: &EventId, event: &EventWrite) -> Result<Event, ServiceError> {
        let updated = self
            .update_event_inner(id, event)
            .await
            .inspect_err(|err| log_failure(Operation::UpdateEvent, Some(id), err))?;
        info!(event_id = %id, "events: updated");
        Ok(updated)
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), ServiceError> {
        self.delete_event_inner(id)
            .await
            .inspect_err(|err| log_failure(Operation::DeleteEvent, Some(id), err))?;
        info!(event_id = %id, "events: deleted");
        Ok(())
    }
}

/// Maps the response status onto the error taxonomy and parses a success body.
///
/// A 404 is only a not-found condition when the request targeted a specific event.
async fn read_payload(response: Response, target: Option<&EventId>) -> Result<Value, ServiceError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = target {
            return Err(ServiceError::NotFound { id: id.clone() });
        }
    }

    let body = response.text().await?;
    if !status.is_success() {
        return Err(ServiceError::Server { status, body });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|err| ServiceError::MalformedResponse {
        detail: err.to_string(),
    })
}

fn log_failure(operation: Operation, id: Option<&EventId>, err: &ServiceError) {
    let event_id = id.map(EventId::as_str).unwrap_or_default();
    match err {
        ServiceError::Server { status, body } => error!(
            operation = operation.as_str(),
            event_id,
            status = status.as_u16(),
            body = %body,
            "events: backend rejected request"
        ),
        other => error!(
            operation = operation.as_str(),
            event_id,
            error = %other,
            "events: request failed"
        ),
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
