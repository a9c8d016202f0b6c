//! Shared create/edit form: draft fields, validation and submission lifecycle.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Event, EventDraft, EventId},
    error::FieldErrors,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::Operation,
    navigation::{Navigator, Route, ScheduledNavigation},
    service::EventService,
    validation::prepare_write,
};

pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_millis(1500);

pub const CREATED_MESSAGE: &str = "event created";
pub const UPDATED_MESSAGE: &str = "event updated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EventId),
}

impl FormMode {
    fn submit_operation(&self) -> Operation {
        match self {
            FormMode::Create => Operation::CreateEvent,
            FormMode::Edit(_) => Operation::UpdateEvent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    LoadingExisting,
    LoadFailed { message: String },
    Editing,
    Submitting,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub mode: FormMode,
    pub phase: FormPhase,
    pub draft: EventDraft,
    pub errors: FieldErrors,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Loaded(Event),
    LoadFailed(String),
    TitleChanged(String),
    DateChanged(String),
    LocationChanged(String),
    ValidationFailed(FieldErrors),
    SubmitStarted,
    SubmitSucceeded,
    SubmitFailed(String),
    Discarded,
}

impl FormState {
    pub fn create() -> Self {
        Self::with_phase(FormMode::Create, FormPhase::Editing)
    }

    pub fn edit(id: EventId) -> Self {
        Self::with_phase(FormMode::Edit(id), FormPhase::LoadingExisting)
    }

    fn with_phase(mode: FormMode, phase: FormPhase) -> Self {
        Self {
            mode,
            phase,
            draft: EventDraft::default(),
            errors: FieldErrors::new(),
            success_message: None,
            error_message: None,
        }
    }

    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::Loaded(event) => {
                if self.phase == FormPhase::LoadingExisting {
                    self.draft = EventDraft::from(&event);
                    self.phase = FormPhase::Editing;
                }
            }
            FormAction::LoadFailed(message) => {
                if self.phase == FormPhase::LoadingExisting {
                    self.phase = FormPhase::LoadFailed { message };
                }
            }
            FormAction::TitleChanged(value) => {
                if self.is_editable() {
                    self.draft.title = value;
                }
            }
            FormAction::DateChanged(value) => {
                if self.is_editable() {
                    self.draft.date = value;
                }
            }
            FormAction::LocationChanged(value) => {
                if self.is_editable() {
                    self.draft.location = value;
                }
            }
            FormAction::ValidationFailed(errors) => {
                self.errors = errors;
                self.success_message = None;
                self.error_message = None;
                self.phase = FormPhase::Editing;
            }
            FormAction::SubmitStarted => {
                self.errors = FieldErrors::new();
                self.success_message = None;
                self.error_message = None;
                self.phase = FormPhase::Submitting;
            }
            FormAction::SubmitSucceeded => {
                let message = match self.mode {
                    FormMode::Create => {
                        self.draft = EventDraft::default();
                        CREATED_MESSAGE
                    }
                    FormMode::Edit(_) => UPDATED_MESSAGE,
                };
                self.success_message = Some(message.to_string());
                self.phase = FormPhase::Success;
            }
            FormAction::SubmitFailed(message) => {
                self.error_message = Some(message);
                self.phase = FormPhase::Editing;
            }
            FormAction::Discarded => {
                self.draft = EventDraft::default();
                self.errors = FieldErrors::new();
            }
        }
    }

    pub fn is_editable(&self) -> bool {
        self.phase == FormPhase::Editing
    }

    /// Whether field inputs are rendered at all. Not while loading or after a failed load.
    pub fn shows_form(&self) -> bool {
        matches!(
            self.phase,
            FormPhase::Editing | FormPhase::Submitting | FormPhase::Success
        )
    }

    pub fn can_cancel(&self) -> bool {
        self.phase != FormPhase::Submitting
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    Saved(Event),
    /// Backend call failed; carries the message shown to the user.
    Failed(String),
    /// Form was not in a submittable phase or was torn down.
    Ignored,
}

struct FormInner {
    state: FormState,
    mounted: bool,
    in_flight: bool,
    navigation: Option<ScheduledNavigation>,
}

/// Drives one create or edit screen. Cloning yields another handle to the same screen.
#[derive(Clone)]
pub struct EventFormController {
    service: Arc<dyn EventService>,
    navigator: Navigator,
    navigation_delay: Duration,
    inner: Arc<Mutex<FormInner>>,
}

impl EventFormController {
    pub fn create(service: Arc<dyn EventService>, navigator: Navigator) -> Self {
        Self::with_state(service, navigator, FormState::create())
    }

    pub fn edit(service: Arc<dyn EventService>, navigator: Navigator, id: EventId) -> Self {
        Self::with_state(service, navigator, FormState::edit(id))
    }

    fn with_state(service: Arc<dyn EventService>, navigator: Navigator, state: FormState) -> Self {
        Self {
            service,
            navigator,
            navigation_delay: DEFAULT_NAVIGATION_DELAY,
            inner: Arc::new(Mutex::new(FormInner {
                state,
                mounted: true,
                in_flight: false,
                navigation: None,
            })),
        }
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    pub async fn snapshot(&self) -> FormState {
        self.inner.lock().await.state.clone()
    }

    /// Loads the event being edited. Create forms are ready immediately.
    pub async fn mount(&self) {
        let id = {
            let mut inner = self.inner.lock().await;
            if !inner.mounted || inner.in_flight {
                return;
            }
            let FormMode::Edit(id) = &inner.state.mode else {
                return;
            };
            if inner.state.phase != FormPhase::LoadingExisting {
                return;
            }
            let id = id.clone();
            inner.in_flight = true;
            id
        };

        let result = self.service.get_event(&id).await;

        let mut inner = self.inner.lock().await;
        inner.in_flight = false;
        if !inner.mounted {
            debug!(event_id = %id, "events: edit load arrived after teardown; ignored");
            return;
        }

        match result {
            Ok(event) => {
                debug!(event_id = %id, "events: edit form populated");
                inner.state.apply(FormAction::Loaded(event));
            }
            Err(err) => {
                let message = err.user_message(Operation::GetEvent);
                warn!(event_id = %id, error = %err, "events: edit load failed");
                inner.state.apply(FormAction::LoadFailed(message));
            }
        }
    }

    pub async fn set_title(&self, value: impl Into<String>) {
        self.dispatch(FormAction::TitleChanged(value.into())).await;
    }

    pub async fn set_date(&self, value: impl Into<String>) {
        self.dispatch(FormAction::DateChanged(value.into())).await;
    }

    pub async fn set_location(&self, value: impl Into<String>) {
        self.dispatch(FormAction::LocationChanged(value.into())).await;
    }

    async fn dispatch(&self, action: FormAction) {
        let mut inner = self.inner.lock().await;
        if inner.mounted {
            inner.state.apply(action);
        }
    }

    /// Validates, then creates or updates. Invalid drafts never reach the backend.
    pub async fn submit(&self) -> SubmitOutcome {
        let (mode, write) = {
            let mut inner = self.inner.lock().await;
            if !inner.mounted || inner.in_flight || !inner.state.is_editable() {
                return SubmitOutcome::Ignored;
            }
            match prepare_write(&inner.state.draft) {
                Ok(write) => {
                    inner.in_flight = true;
                    inner.state.apply(FormAction::SubmitStarted);
                    (inner.state.mode.clone(), write)
                }
                Err(rejected) => {
                    let errors = rejected.0;
                    debug!(invalid_fields = errors.len(), "events: draft rejected by validation");
                    inner
                        .state
                        .apply(FormAction::ValidationFailed(errors.clone()));
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        let result = match &mode {
            FormMode::Create => self.service.create_event(&write).await,
            FormMode::Edit(id) => self.service.update_event(id, &write).await,
        };

        let mut inner = self.inner.lock().await;
        inner.in_flight = false;
        if !inner.mounted {
            debug!("events: submit response arrived after teardown; ignored");
            return SubmitOutcome::Ignored;
        }

        match result {
            Ok(event) => {
                info!(event_id = %event.id, "events: form saved");
                inner.state.apply(FormAction::SubmitSucceeded);
                inner.navigation = Some(
                    self.navigator
                        .schedule(Route::EventList, self.navigation_delay),
                );
                SubmitOutcome::Saved(event)
            }
            Err(err) => {
                let message = err.user_message(mode.submit_operation());
                warn!(error = %err, "events: form save failed");
                inner.state.apply(FormAction::SubmitFailed(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Discards the draft and returns to the list at once. Refused while submitting.
    pub async fn cancel(&self) -> bool {
        {
            let mut inner = self.inner.lock().await;
            if !inner.mounted || !inner.state.can_cancel() {
                return false;
            }
            inner.navigation = None;
            inner.state.apply(FormAction::Discarded);
        }
        self.navigator.navigate(Route::EventList);
        true
    }

    /// Tears the screen down: pending navigation is aborted and late responses ignored.
    pub async fn unmount(&self) {
        let mut inner = self.inner.lock().await;
        inner.mounted = false;
        inner.navigation = None;
    }
}

#[cfg(test)]
#[path = "tests/form_controller_tests.rs"]
mod tests;
