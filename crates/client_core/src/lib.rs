//! Client core for the sporting events manager: backend access, draft validation and the
//! list/form screen controllers front ends render from.

pub mod config;
pub mod error;
pub mod form_controller;
pub mod format;
pub mod list_controller;
pub mod navigation;
pub mod normalize;
pub mod service;
pub mod validation;

pub use config::{load_settings, ClientSettings};
pub use error::{Operation, ServiceError, ServiceErrorKind};
pub use form_controller::{EventFormController, FormMode, FormPhase, FormState, SubmitOutcome};
pub use format::format_event_date;
pub use list_controller::{EventListController, ListPhase, ListState};
pub use navigation::{Navigator, Route};
pub use service::{EventService, HttpEventService};
pub use validation::validate;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
