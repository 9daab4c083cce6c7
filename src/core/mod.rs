//! Core data structures for threat-intelligence events

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::borrow::Cow;

pub mod feed;
pub use feed::*;

/// An ordered JSON object, used for child records and extra event fields.
pub type Record = Map<String, Value>;

/// Name of the child list holding attributes in a feed event.
pub const ATTRIBUTE_FIELD: &str = "Attribute";
/// Name of the child list holding tags in a feed event.
pub const TAG_FIELD: &str = "Tag";

/// One event of the feed with its nested attributes and tags.
///
/// `attribute_count` is normalized at parse time: `null` or absent becomes 0,
/// integers, integral floats and integer strings are coerced, anything else
/// is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub date: Option<String>,
    pub attribute_count: i64,
    pub attributes: Vec<Record>,
    pub tags: Vec<Record>,
    /// Every remaining field (info, orgc_id, threat_level_id, ...)
    pub fields: Record,
}

impl Event {
    /// Builds an event from one JSON object of the feed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::format(format!("event is not a JSON object: {}", value)))?;

        let id = match object.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            Some(other) => {
                return Err(Error::format(format!("event id must be a string, got {}", other)))
            }
            None => return Err(Error::format("event without an id field")),
        };

        let date = match object.get("date") {
            Some(Value::String(date)) => Some(date.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        let attribute_count = coerce_count(&id, object.get("attribute_count"))?;
        let attributes = child_records(&id, ATTRIBUTE_FIELD, object.get(ATTRIBUTE_FIELD))?;
        let tags = child_records(&id, TAG_FIELD, object.get(TAG_FIELD))?;

        let fields = object
            .iter()
            .filter(|(key, _)| {
                !matches!(
                    key.as_str(),
                    "id" | "date" | "attribute_count" | ATTRIBUTE_FIELD | TAG_FIELD
                )
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Event { id, date, attribute_count, attributes, tags, fields })
    }

    /// Children of the given kind, in feed order.
    pub fn children(&self, kind: ChildKind) -> &[Record] {
        match kind {
            ChildKind::Attribute => &self.attributes,
            ChildKind::Tag => &self.tags,
        }
    }
}

/// The two one-to-many relations an event owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Attribute,
    Tag,
}

impl ChildKind {
    /// Name of the ordinal level in a composite index.
    pub fn level_name(self) -> &'static str {
        match self {
            ChildKind::Attribute => "attribute",
            ChildKind::Tag => "tag",
        }
    }
}

/// Row types that expose named scalar columns.
///
/// Aggregation and range filtering work over anything implementing this, so
/// events and flattened child rows share one grouping and filtering path.
pub trait Columnar {
    fn column(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl Columnar for Event {
    fn column(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" | "event" => Some(Cow::Borrowed(self.id.as_str())),
            "date" => self.date.as_deref().map(Cow::Borrowed),
            "attribute_count" => Some(Cow::Owned(self.attribute_count.to_string())),
            other => self.fields.get(other).and_then(scalar_text),
        }
    }
}

/// Text form of a scalar JSON value; `null`, arrays and objects have none.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_count(id: &str, value: Option<&Value>) -> Result<i64> {
    let not_an_integer = |shown: String| {
        Error::format(format!("attribute_count of event {} is not an integer: {}", id, shown))
    };

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| not_an_integer(n.to_string())),
        Some(Value::String(s)) => {
            s.trim().parse::<i64>().map_err(|_| not_an_integer(format!("{:?}", s)))
        }
        Some(other) => Err(not_an_integer(other.to_string())),
    }
}

fn child_records(id: &str, field: &str, value: Option<&Value>) -> Result<Vec<Record>> {
    let Some(Value::Array(items)) = value else {
        // Absent, null, or any non-list value: no children
        return Ok(Vec::new());
    };

    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            item.as_object().cloned().ok_or_else(|| {
                Error::format(format!(
                    "{} entry {} of event {} is not a JSON object",
                    field, position, id
                ))
            })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_attribute_count_defaults_to_zero() {
        let event = Event::from_value(&json!({
            "id": "1",
            "date": "2023-01-01",
            "attribute_count": null
        }))
        .unwrap();
        assert_eq!(event.attribute_count, 0);
        assert!(event.attributes.is_empty());
        assert!(event.tags.is_empty());
    }

    #[test]
    fn test_string_attribute_count_is_coerced() {
        let event =
            Event::from_value(&json!({"id": "7", "attribute_count": " 12 "})).unwrap();
        assert_eq!(event.attribute_count, 12);
    }

    #[test]
    fn test_non_integer_attribute_count_is_rejected() {
        let err = Event::from_value(&json!({"id": "7", "attribute_count": "twelve"}))
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("twelve"));
    }

    #[test]
    fn test_negative_and_integral_float_counts_are_coerced() {
        for (raw, expected) in [(json!("-1"), -1), (json!(-1), -1), (json!(2.0), 2)] {
            let event =
                Event::from_value(&json!({"id": "1", "attribute_count": raw})).unwrap();
            assert_eq!(event.attribute_count, expected);
        }
    }

    #[test]
    fn test_fractional_count_is_rejected() {
        let err = Event::from_value(&json!({"id": "1", "attribute_count": 2.5})).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = Event::from_value(&json!({"date": "2023-01-01"})).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_non_list_tag_field_means_no_tags() {
        let event = Event::from_value(&json!({
            "id": 42,
            "Tag": "not-a-list",
            "Attribute": [{"category": "Network", "type": "ip"}]
        }))
        .unwrap();
        assert_eq!(event.id, "42");
        assert!(event.tags.is_empty());
        assert_eq!(event.attributes.len(), 1);
    }

    #[test]
    fn test_columns_fall_back_to_extra_fields() {
        let event = Event::from_value(&json!({
            "id": "3",
            "info": "phishing wave",
            "threat_level_id": 2,
            "published": true
        }))
        .unwrap();
        assert_eq!(event.column("info").as_deref(), Some("phishing wave"));
        assert_eq!(event.column("threat_level_id").as_deref(), Some("2"));
        assert_eq!(event.column("published").as_deref(), Some("true"));
        assert_eq!(event.column("event").as_deref(), Some("3"));
        assert!(event.column("missing").is_none());
    }
}
