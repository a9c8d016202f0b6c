use reqwest::StatusCode;
use shared::domain::EventId;
use thiserror::Error;

/// Backend call a failure happened in; selects the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListEvents,
    GetEvent,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListEvents => "list_events",
            Operation::GetEvent => "get_event",
            Operation::CreateEvent => "create_event",
            Operation::UpdateEvent => "update_event",
            Operation::DeleteEvent => "delete_event",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotFound,
    Transport,
    Server,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("event {id} not found")]
    NotFound { id: EventId },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Server { status: StatusCode, body: String },
    #[error("malformed response payload: {detail}")]
    MalformedResponse { detail: String },
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            ServiceError::NotFound { .. } => ServiceErrorKind::NotFound,
            ServiceError::Transport(_) => ServiceErrorKind::Transport,
            ServiceError::Server { .. } | ServiceError::MalformedResponse { .. } => {
                ServiceErrorKind::Server
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ServiceErrorKind::NotFound
    }

    /// Message safe to show to the user. Raw bodies and transport details stay in the logs.
    pub fn user_message(&self, operation: Operation) -> String {
        let message = match (self.kind(), operation) {
            (ServiceErrorKind::Transport, _) => {
                "could not reach the events service, please try again"
            }
            (ServiceErrorKind::NotFound, Operation::GetEvent) => "could not load event details",
            (ServiceErrorKind::NotFound, _) => "event no longer exists",
            (ServiceErrorKind::Server, Operation::ListEvents) => "could not load events",
            (ServiceErrorKind::Server, Operation::GetEvent) => "could not load event details",
            (ServiceErrorKind::Server, Operation::CreateEvent) => "could not create event",
            (ServiceErrorKind::Server, Operation::UpdateEvent) => "could not update event",
            (ServiceErrorKind::Server, Operation::DeleteEvent) => "could not delete event",
        };
        message.to_string()
    }
}
