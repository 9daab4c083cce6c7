//! Category → type nesting rebuilt from a two-level count index
//!
//! The grouped counts arrive as a flat sequence of leaves whose outer level
//! code only tells which category each leaf belongs to. Walking the codes in
//! row order, a change of code closes the current category's type list and
//! opens the next one. This only works while every category occupies one
//! contiguous run of leaves, which is why the codes must never decrease.
//!
//! The nesting carries labels only. Counts stay in the flat sequence and are
//! consumed leaf by leaf, in the same order, by [`crate::report`].

use crate::aggregation::IndexLevels;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreemapLabels {
    pub categories: Vec<String>,
    /// `types[i]` are the leaves of `categories[i]`, in index order
    pub types: Vec<Vec<String>>,
}

impl TreemapLabels {
    /// Type labels of every category, concatenated in category order.
    pub fn flatten(&self) -> Vec<String> {
        self.types.iter().flatten().cloned().collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.types.iter().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories.iter().map(String::as_str).zip(self.types.iter().map(Vec::as_slice))
    }
}

pub fn create_labels_treemap(index: &IndexLevels) -> Result<TreemapLabels> {
    let [category_levels, type_levels] = index.levels.as_slice() else {
        return Err(Error::format(format!(
            "treemap labels need a two-level index, got {} levels",
            index.levels.len()
        )));
    };
    let [category_codes, type_codes] = index.codes.as_slice() else {
        return Err(Error::format(format!(
            "treemap labels need two code arrays, got {}",
            index.codes.len()
        )));
    };
    if category_codes.len() != type_codes.len() {
        return Err(Error::format(format!(
            "category and type code arrays differ in length ({} vs {})",
            category_codes.len(),
            type_codes.len()
        )));
    }

    let mut labels = TreemapLabels::default();
    let mut current: Option<usize> = None;
    let mut types: Vec<String> = Vec::new();

    for (row, (&category, &typ)) in category_codes.iter().zip(type_codes).enumerate() {
        if current != Some(category) {
            if let Some(previous) = current {
                if category < previous {
                    return Err(Error::format(format!(
                        "category code {} at row {} follows {}; categories must be contiguous",
                        category, row, previous
                    )));
                }
                labels.types.push(std::mem::take(&mut types));
            }
            let name = category_levels.get(category).ok_or_else(|| {
                Error::format(format!("category code {} out of range at row {}", category, row))
            })?;
            labels.categories.push(name.clone());
            current = Some(category);
        }

        let name = type_levels.get(typ).ok_or_else(|| {
            Error::format(format!("type code {} out of range at row {}", typ, row))
        })?;
        types.push(name.clone());
    }

    if current.is_some() {
        labels.types.push(types);
    }

    Ok(labels)
}
