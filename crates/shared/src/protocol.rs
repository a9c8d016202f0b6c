use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Request body for create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWrite {
    pub title: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub location: String,
}

/// Renders a calendar date as midnight UTC, e.g. `2025-03-31T00:00:00.000Z`.
pub fn to_wire_date(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a calendar date from either a full RFC 3339 date-time (taking its UTC date),
/// a naive `YYYY-MM-DDTHH:MM:SS` timestamp, or a bare `YYYY-MM-DD` date.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc).date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    NaiveDate::parse_from_str(raw, INPUT_DATE_FORMAT).ok()
}

pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_wire_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_event_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized event date '{raw}'")))
    }
}

/// Classification of a list response body. Backends in the wild answer `GET /events`
/// with several layouts; each maps onto one flat ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `{"events": [...]}`
    Collection(Vec<Value>),
    /// `{"event": {...}}`
    Single(Value),
    /// `[...]`
    Array(Vec<Value>),
    /// `{"a": {...}, "b": {...}}`
    Map(Map<String, Value>),
    Unrecognized(Value),
}

impl ResponseShape {
    pub fn classify(payload: Value) -> Self {
        match unwrap_envelope(payload) {
            Value::Array(items) => Self::Array(items),
            Value::Object(mut object) => {
                match object.remove("events") {
                    Some(Value::Array(items)) => return Self::Collection(items),
                    Some(Value::Object(items)) => return Self::Map(items),
                    Some(other) => {
                        object.insert("events".to_string(), other);
                        return Self::Unrecognized(Value::Object(object));
                    }
                    None => {}
                }
                match object.remove("event") {
                    Some(event @ Value::Object(_)) => return Self::Single(event),
                    Some(other) => {
                        object.insert("event".to_string(), other);
                        return Self::Unrecognized(Value::Object(object));
                    }
                    None => {}
                }
                if !object.is_empty() && object.values().all(Value::is_object) {
                    Self::Map(object)
                } else {
                    Self::Unrecognized(Value::Object(object))
                }
            }
            other => Self::Unrecognized(other),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Collection(_) => "collection",
            Self::Single(_) => "single",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Unrecognized(_) => "unrecognized",
        }
    }

    /// Raw items in backend order. Unrecognized payloads yield nothing.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Collection(items) | Self::Array(items) => items,
            Self::Single(item) => vec![item],
            Self::Map(items) => items.into_iter().map(|(_, item)| item).collect(),
            Self::Unrecognized(_) => Vec::new(),
        }
    }
}

/// Strips a `{"data": ...}` envelope when the object carries no event keys of its own.
pub fn unwrap_envelope(payload: Value) -> Value {
    match payload {
        Value::Object(mut object)
            if !object.contains_key("events")
                && !object.contains_key("event")
                && matches!(object.get("data"), Some(Value::Object(_) | Value::Array(_))) =>
        {
            let data = object.remove("data").unwrap_or(Value::Null);
            unwrap_envelope(data)
        }
        other => other,
    }
}

/// Extracts the event object from a single-item response: `{"event": {...}}`,
/// `{"data": {"event": {...}}}`, `{"data": {...}}`, or the bare object.
pub fn single_item(payload: Value) -> Value {
    match unwrap_envelope(payload) {
        Value::Object(mut object) => match object.remove("event") {
            Some(event @ Value::Object(_)) => event,
            Some(other) => {
                object.insert("event".to_string(), other);
                Value::Object(object)
            }
            None => Value::Object(object),
        },
        other => other,
    }
}
