//! Treemap chart and HTML breakdown of category → type counts
//!
//! [`TreemapChart::build`] pairs the rebuilt label nesting with the flat
//! count sequence by walking both in lockstep: the n-th leaf label, in
//! category order, receives the n-th count.

pub mod html;
pub mod palette;
pub mod svg;

pub use palette::{hashed_colour, ColourScheme};

use crate::aggregation::GroupedCount;
use crate::error::{Error, Result};
use crate::labels::{create_labels_treemap, TreemapLabels};
use log::{debug, info};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default output name for the chart.
pub const DEFAULT_TREEMAP_PATH: &str = "attribute_treemap.svg";
/// Default output name for the breakdown table.
pub const DEFAULT_TABLE_PATH: &str = "attribute_table.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreemapLeaf {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreemapCategory {
    pub name: String,
    pub colour: String,
    pub leaves: Vec<TreemapLeaf>,
}

impl TreemapCategory {
    pub fn total(&self) -> u64 {
        self.leaves.iter().map(|leaf| leaf.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreemapChart {
    pub title: String,
    pub categories: Vec<TreemapCategory>,
}

impl TreemapChart {
    /// Attaches `counts` to the leaves of `labels` in order.
    pub fn build(
        title: &str,
        labels: &TreemapLabels,
        counts: &[u64],
        scheme: &ColourScheme,
    ) -> Result<Self> {
        if labels.leaf_count() != counts.len() {
            return Err(Error::format(format!(
                "{} treemap leaves but {} counts",
                labels.leaf_count(),
                counts.len()
            )));
        }

        let colours = scheme.assign(&labels.categories)?;
        let mut cursor = counts.iter();
        let mut categories = Vec::with_capacity(labels.categories.len());

        for ((name, types), colour) in labels.iter().zip(colours) {
            let leaves = types
                .iter()
                .zip(cursor.by_ref())
                .map(|(label, &value)| TreemapLeaf { label: label.clone(), value })
                .collect();
            categories.push(TreemapCategory { name: name.to_string(), colour, leaves });
        }

        Ok(Self { title: title.to_string(), categories })
    }

    /// Builds the chart straight from two-level `(category, type)` counts.
    pub fn from_counts(title: &str, counts: &GroupedCount, scheme: &ColourScheme) -> Result<Self> {
        let labels = create_labels_treemap(&counts.index_levels())?;
        debug!(
            "Rebuilt {} categories with {} leaves for the treemap",
            labels.categories.len(),
            labels.leaf_count()
        );
        Self::build(title, &labels, counts.counts(), scheme)
    }

    pub fn total(&self) -> u64 {
        self.categories.iter().map(TreemapCategory::total).sum()
    }

    pub fn colours(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.colour.as_str()).collect()
    }

    pub fn write_treemap(&self, path: impl AsRef<Path>, width: u32, height: u32) -> Result<()> {
        let path = path.as_ref();
        write_document(path, &self.render_svg(width, height))?;
        info!("Wrote treemap to {}", path.display());
        Ok(())
    }

    pub fn write_table(&self, path: impl AsRef<Path>, stylesheet: &str) -> Result<()> {
        let path = path.as_ref();
        write_document(path, &self.render_table_html(stylesheet))?;
        info!("Wrote breakdown table to {}", path.display());
        Ok(())
    }
}

/// Creates (truncating) `path` and writes `contents` in full before closing.
fn write_document(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(path).map_err(|e| Error::resource(path, e))?;
    file.write_all(contents.as_bytes()).map_err(|e| Error::resource(path, e))?;
    file.flush().map_err(|e| Error::resource(path, e))
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
