//! Turns loosely shaped backend payloads into domain events.

use serde_json::Value;
use shared::{
    domain::Event,
    protocol::{single_item, ResponseShape},
};
use tracing::{debug, warn};

use crate::error::ServiceError;

/// Flattens any supported list layout into events in backend order.
///
/// Unknown layouts are logged and read as an empty list; entries that do not decode as
/// events are skipped.
pub fn normalize_event_list(payload: Value) -> Vec<Event> {
    let shape = ResponseShape::classify(payload);
    let kind = shape.kind();

    if let ResponseShape::Unrecognized(raw) = &shape {
        warn!(
            payload_type = json_type(raw),
            "events: unrecognized list response shape; treating as empty"
        );
        return Vec::new();
    }

    let items = shape.into_items();
    let total = items.len();
    let events: Vec<Event> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Event>(item) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(index, error = %err, "events: skipping undecodable list entry");
                None
            }
        })
        .collect();

    debug!(
        shape = kind,
        total,
        decoded = events.len(),
        "events: normalized list response"
    );
    events
}

pub fn normalize_event(payload: Value) -> Result<Event, ServiceError> {
    serde_json::from_value(single_item(payload)).map_err(|err| ServiceError::MalformedResponse {
        detail: err.to_string(),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
