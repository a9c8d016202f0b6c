//! Pure checks run on a draft before it may be sent to the backend.

use chrono::NaiveDate;
use shared::{
    domain::{EventDraft, Field},
    error::{FieldErrors, ValidationError},
    protocol::{EventWrite, INPUT_DATE_FORMAT},
};

pub const TITLE_REQUIRED: &str = "title required";
pub const DATE_REQUIRED: &str = "date required";
pub const DATE_INVALID: &str = "date invalid";
pub const LOCATION_REQUIRED: &str = "location required";

/// Checks every field and reports all failures at once. Empty result means submittable.
pub fn validate(draft: &EventDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.title.trim().is_empty() {
        errors.insert(Field::Title, TITLE_REQUIRED);
    }

    if draft.date.trim().is_empty() {
        errors.insert(Field::Date, DATE_REQUIRED);
    } else if parse_input_date(&draft.date).is_none() {
        errors.insert(Field::Date, DATE_INVALID);
    }

    if draft.location.trim().is_empty() {
        errors.insert(Field::Location, LOCATION_REQUIRED);
    }

    errors
}

/// Only the date input's own `YYYY-MM-DD` form is accepted; date-times would shift the day.
fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), INPUT_DATE_FORMAT).ok()
}

/// Validates the draft and converts it into the request body sent on create/update.
pub fn prepare_write(draft: &EventDraft) -> Result<EventWrite, ValidationError> {
    let errors = validate(draft);
    if !errors.is_empty() {
        return Err(ValidationError(errors));
    }

    let Some(date) = parse_input_date(&draft.date) else {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Date, DATE_INVALID);
        return Err(ValidationError(errors));
    };

    Ok(EventWrite {
        title: draft.title.trim().to_string(),
        date,
        location: draft.location.trim().to_string(),
    })
}
