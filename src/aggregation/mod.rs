//! Group-and-count over flattened tables
//!
//! Groups keep the order in which their key tuple was first seen in the
//! input rows. That order is what the chart and the breakdown table display,
//! and what [`crate::labels`] relies on when it rebuilds the category nesting,
//! so nothing here sorts.

use crate::core::Columnar;
use crate::error::{Error, Result};
use crate::flatten::FlatTable;
use log::debug;
use regex::Regex;
use std::collections::HashMap;

/// Row counts per key tuple, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCount {
    names: Vec<String>,
    keys: Vec<Vec<String>>,
    counts: Vec<u64>,
}

/// A multi-level index split into per-level distinct values and per-row
/// integer codes into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLevels {
    pub names: Vec<String>,
    /// Distinct values of each level, first-seen order
    pub levels: Vec<Vec<String>>,
    /// `codes[level][row]` indexes into `levels[level]`
    pub codes: Vec<Vec<usize>>,
}

impl GroupedCount {
    fn empty(names: Vec<String>) -> Self {
        Self { names, keys: Vec::new(), counts: Vec::new() }
    }

    fn add(&mut self, positions: &mut HashMap<Vec<String>, usize>, key: Vec<String>, count: u64) {
        if let Some(&position) = positions.get(&key) {
            self.counts[position] += count;
        } else {
            positions.insert(key.clone(), self.keys.len());
            self.keys.push(key);
            self.counts.push(count);
        }
    }

    /// Level names, outermost first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn keys(&self) -> &[Vec<String>] {
        &self.keys
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], u64)> {
        self.keys.iter().map(Vec::as_slice).zip(self.counts.iter().copied())
    }

    pub fn get(&self, key: &[&str]) -> Option<u64> {
        self.iter()
            .find(|(k, _)| k.len() == key.len() && k.iter().zip(key).all(|(a, b)| a == b))
            .map(|(_, count)| count)
    }

    /// Sums counts over every level not named in `keep`.
    ///
    /// The surviving tuples keep the order of their first occurrence.
    pub fn collapse(&self, keep: &[&str]) -> Result<Self> {
        let selected: Vec<usize> = keep
            .iter()
            .map(|name| {
                self.names.iter().position(|n| n == name).ok_or_else(|| {
                    Error::format(format!("no level named {} in {:?}", name, self.names))
                })
            })
            .collect::<Result<_>>()?;

        let mut collapsed = Self::empty(keep.iter().map(|s| s.to_string()).collect());
        let mut positions = HashMap::new();
        for (key, count) in self.iter() {
            let reduced = selected.iter().map(|&level| key[level].clone()).collect();
            collapsed.add(&mut positions, reduced, count);
        }
        Ok(collapsed)
    }

    /// Reorders groups so each first-level value forms one contiguous run.
    ///
    /// Runs follow the first-seen order of their first-level value, groups
    /// inside a run keep their relative order, and keys move together with
    /// their counts.
    pub fn cluster_by_first_level(&self) -> Self {
        let mut runs: Vec<(&str, Vec<usize>)> = Vec::new();
        for (row, key) in self.keys.iter().enumerate() {
            let head = key.first().map(String::as_str).unwrap_or_default();
            match runs.iter_mut().find(|(value, _)| *value == head) {
                Some((_, rows)) => rows.push(row),
                None => runs.push((head, vec![row])),
            }
        }

        let order: Vec<usize> = runs.into_iter().flat_map(|(_, rows)| rows).collect();
        Self {
            names: self.names.clone(),
            keys: order.iter().map(|&row| self.keys[row].clone()).collect(),
            counts: order.iter().map(|&row| self.counts[row]).collect(),
        }
    }

    pub fn index_levels(&self) -> IndexLevels {
        let depth = self.names.len();
        let mut levels: Vec<Vec<String>> = vec![Vec::new(); depth];
        let mut codes: Vec<Vec<usize>> = vec![Vec::with_capacity(self.len()); depth];
        let mut lookup: Vec<HashMap<&str, usize>> = vec![HashMap::new(); depth];

        for key in &self.keys {
            for (level, value) in key.iter().enumerate() {
                let code = *lookup[level].entry(value.as_str()).or_insert_with(|| {
                    levels[level].push(value.clone());
                    levels[level].len() - 1
                });
                codes[level].push(code);
            }
        }

        IndexLevels { names: self.names.clone(), levels, codes }
    }
}

/// Counts rows per distinct tuple of `key_columns`.
///
/// Rows lacking any of the key columns are left out of every group.
pub fn count_by_group<'a, T: Columnar + 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    key_columns: &[&str],
) -> Result<GroupedCount> {
    if key_columns.is_empty() {
        return Err(Error::format("grouping needs at least one key column"));
    }

    let mut grouped = GroupedCount::empty(key_columns.iter().map(|s| s.to_string()).collect());
    let mut positions = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let key: Option<Vec<String>> = key_columns
            .iter()
            .map(|column| row.column(column).map(|value| value.into_owned()))
            .collect();
        match key {
            Some(key) => grouped.add(&mut positions, key, 1),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} rows without all of {:?}", skipped, key_columns);
    }
    Ok(grouped)
}

/// Attribute counts keyed by `(event, category, type)`.
pub fn count_attributes_per_event_category_type(attributes: &FlatTable) -> Result<GroupedCount> {
    count_by_group(attributes, &["event", "category", "type"])
}

/// Tag occurrences keyed by tag `name`.
pub fn count_tag_occurrences(tags: &FlatTable) -> Result<GroupedCount> {
    count_by_group(tags, &["name"])
}

/// Events owning at least one tag whose name matches `pattern`.
pub fn is_tag_in(tags: &FlatTable, pattern: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(pattern)?;
    let mut events: Vec<String> = Vec::new();
    for row in tags {
        let matched = row.column("name").map_or(false, |name| pattern.is_match(&name));
        if matched && !events.contains(&row.key.event) {
            events.push(row.key.event.clone());
        }
    }
    Ok(events)
}
