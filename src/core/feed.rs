//! Feed loading: concatenated JSON documents into typed events
//!
//! A feed dump is not a single JSON array but one or more JSON documents
//! written back to back. Each document carries its events under a `response`
//! key, either as an object mapping identifiers to events or as an array of
//! events (optionally wrapped as `{"Event": {...}}`). A top-level array of
//! such documents is also accepted.

use crate::core::Event;
use crate::error::{Error, Result};
use log::debug;
use serde_json::{Deserializer, Value};
use std::fs;
use std::path::Path;

/// Parses every event of a feed held in memory, in document order.
pub fn parse_feed(input: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut documents = 0usize;

    for document in Deserializer::from_str(input).into_iter::<Value>() {
        let document = document?;
        documents += 1;
        collect_events(&document, &mut events)?;
    }

    debug!("Parsed {} events from {} feed documents", events.len(), documents);
    Ok(events)
}

/// Reads and parses a feed file.
pub fn load_feed(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| Error::resource(path, e))?;
    parse_feed(&contents)
}

/// Lists the events of a single already-decoded `response` document.
pub fn events_from_response(document: &Value) -> Result<Vec<Event>> {
    let response = document
        .get("response")
        .ok_or_else(|| Error::format("document has no response key"))?;
    let mut events = Vec::new();
    collect_response(response, &mut events)?;
    Ok(events)
}

fn collect_events(document: &Value, events: &mut Vec<Event>) -> Result<()> {
    match document {
        Value::Array(items) => {
            for item in items {
                collect_events(item, events)?;
            }
            Ok(())
        }
        Value::Object(object) => {
            if let Some(response) = object.get("response") {
                collect_response(response, events)
            } else if object.contains_key("Event") || object.contains_key("id") {
                events.push(Event::from_value(unwrap_event(document))?);
                Ok(())
            } else {
                Err(Error::format("feed document has neither a response key nor an event"))
            }
        }
        other => Err(Error::format(format!("unexpected feed document: {}", other))),
    }
}

fn collect_response(response: &Value, events: &mut Vec<Event>) -> Result<()> {
    match response {
        Value::Object(by_id) => {
            for event in by_id.values() {
                events.push(Event::from_value(unwrap_event(event))?);
            }
            Ok(())
        }
        Value::Array(items) => {
            for event in items {
                events.push(Event::from_value(unwrap_event(event))?);
            }
            Ok(())
        }
        other => Err(Error::format(format!("response must be an object or array, got {}", other))),
    }
}

fn unwrap_event(value: &Value) -> &Value {
    value.get("Event").unwrap_or(value)
}
