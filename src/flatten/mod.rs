//! Flattening of event children into keyed tables
//!
//! Every attribute or tag of an event becomes one [`FlatRow`] addressed by a
//! [`CompositeKey`] `(event, ordinal)`. Rows come out parent-major, then in
//! child order, so within a table the ordinals restart at `0` exactly where
//! ownership moves to the next event.
//!
//! Flattening attaches the owning event key eagerly. The resetting-counter
//! walk in [`index`] is kept for tables whose rows only carry per-event
//! ordinals (see [`FlatTable::from_child_blocks`]) and for broadcasting event
//! columns onto child rows.

pub mod index;

pub use index::{build_double_index, parent_positions, propagate_column, OrdinalPolicy};

use crate::core::{scalar_text, ChildKind, Columnar, Event, Record};
use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// `(owning event key, position within that event's child list)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub event: String,
    pub ordinal: usize,
}

impl CompositeKey {
    pub fn new(event: impl Into<String>, ordinal: usize) -> Self {
        Self { event: event.into(), ordinal }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.event, self.ordinal)
    }
}

/// One flattened child record.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub key: CompositeKey,
    pub fields: Record,
}

impl Columnar for FlatRow {
    fn column(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "event" => Some(Cow::Borrowed(self.key.event.as_str())),
            "ordinal" => Some(Cow::Owned(self.key.ordinal.to_string())),
            other => self.fields.get(other).and_then(scalar_text),
        }
    }
}

/// Flattened children of one kind, in parent-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTable {
    kind: ChildKind,
    columns: Vec<String>,
    rows: Vec<FlatRow>,
}

impl FlatTable {
    pub fn new(kind: ChildKind) -> Self {
        Self { kind, columns: Vec::new(), rows: Vec::new() }
    }

    /// Builds a table from rows, collecting columns in first-seen order.
    pub fn from_rows(kind: ChildKind, rows: Vec<FlatRow>) -> Self {
        let mut table = Self::new(kind);
        for row in rows {
            table.push(row);
        }
        table
    }

    /// Rebuilds keys for rows that only know their per-event ordinal.
    ///
    /// `parent_keys` lists, in block order, the events owning at least one
    /// of the rows.
    pub fn from_child_blocks(
        kind: ChildKind,
        parent_keys: &[String],
        blocks: Vec<(usize, Record)>,
        policy: OrdinalPolicy,
    ) -> Result<Self> {
        let ordinals: Vec<usize> = blocks.iter().map(|(ordinal, _)| *ordinal).collect();
        let keys = build_double_index(parent_keys, &ordinals, policy)?;
        let rows = keys
            .into_iter()
            .zip(blocks)
            .map(|(key, (_, fields))| FlatRow { key, fields })
            .collect();
        Ok(Self::from_rows(kind, rows))
    }

    pub fn push(&mut self, row: FlatRow) {
        for name in row.fields.keys() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn kind(&self) -> ChildKind {
        self.kind
    }

    /// Data columns in first-seen order; the key levels are not included.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FlatRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatRow> {
        self.rows.iter()
    }

    pub fn ordinals(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.key.ordinal).collect()
    }

    /// Event keys in block order, one per ordinal reset.
    ///
    /// Consecutive events sharing an id (overlapping feed dumps) still get
    /// one key per block.
    pub fn event_keys(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.key.ordinal == 0)
            .map(|row| row.key.event.clone())
            .collect()
    }

    /// Sets `name` on every row, overwriting any existing value.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::format(format!(
                "column {} has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.fields.insert(name.to_string(), value);
        }
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
        Ok(())
    }

    /// Rows regrouped by owning event, events in first-seen order.
    pub fn group_by_event(&self) -> Vec<(&str, Vec<&FlatRow>)> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&FlatRow>> = HashMap::new();
        for row in &self.rows {
            let event = row.key.event.as_str();
            groups
                .entry(event)
                .or_insert_with(|| {
                    order.push(event);
                    Vec::new()
                })
                .push(row);
        }
        order
            .into_iter()
            .map(|event| (event, groups.remove(event).unwrap_or_default()))
            .collect()
    }

    /// A table with only the rows accepted by `keep`, columns unchanged.
    pub fn filtered(&self, mut keep: impl FnMut(&FlatRow) -> bool) -> Self {
        Self {
            kind: self.kind,
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FlatTable {
    type Item = &'a FlatRow;
    type IntoIter = std::slice::Iter<'a, FlatRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Flattens one child relation of every event.
pub fn flatten_children(events: &[Event], kind: ChildKind) -> FlatTable {
    let mut table = FlatTable::new(kind);
    for event in events {
        for (ordinal, child) in event.children(kind).iter().enumerate() {
            table.push(FlatRow {
                key: CompositeKey::new(event.id.clone(), ordinal),
                fields: child.clone(),
            });
        }
    }
    debug!(
        "Flattened {} {} rows from {} events",
        table.len(),
        kind.level_name(),
        events.len()
    );
    table
}

/// Every attribute of every event.
pub fn attributes_list_build(events: &[Event]) -> FlatTable {
    flatten_children(events, ChildKind::Attribute)
}

/// Every tag of every event, each carrying its event's `date`.
pub fn tags_list_build(events: &[Event]) -> Result<FlatTable> {
    let mut tags = flatten_children(events, ChildKind::Tag);

    let dates: Vec<Value> = events
        .iter()
        .filter(|event| !event.tags.is_empty())
        .map(|event| event.date.clone().map_or(Value::Null, Value::String))
        .collect();
    let column = propagate_column(&tags.ordinals(), &dates, OrdinalPolicy::Strict)?;
    tags.add_column("date", column)?;

    Ok(tags)
}
