//! Parent attribution from per-parent child ordinals
//!
//! When children of several parents are concatenated and each child only
//! knows its position inside its own parent's list, the parent of every row
//! is recovered by walking the ordinals: a reset to `0` opens the next
//! parent's block. Parents without children do not open a block, so the
//! parent list handed in here must only contain parents that own at least
//! one child, in block order.

use super::CompositeKey;
use crate::error::{Error, Result};

/// What to do when ordinals break the "start at 0, step by 1" contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrdinalPolicy {
    /// Reject a non-zero first ordinal, gaps and repeats.
    #[default]
    Strict,
    /// Follow the cursor regardless; malformed blocks get attributed to
    /// whichever parent the cursor is on, and rows before the first `0` to
    /// the last parent.
    Lenient,
}

/// Position of the owning parent for every row.
pub fn parent_positions(
    ordinals: &[usize],
    parent_count: usize,
    policy: OrdinalPolicy,
) -> Result<Vec<usize>> {
    let mut positions = Vec::with_capacity(ordinals.len());
    let mut cursor: Option<usize> = None;
    let mut previous: Option<usize> = None;

    for (row, &ordinal) in ordinals.iter().enumerate() {
        if ordinal == 0 {
            cursor = Some(cursor.map_or(0, |c| c + 1));
        } else if policy == OrdinalPolicy::Strict {
            match previous {
                None => {
                    return Err(Error::format(format!(
                        "row 0 has child ordinal {} but the first block must start at 0",
                        ordinal
                    )))
                }
                Some(prev) if ordinal != prev + 1 => {
                    return Err(Error::format(format!(
                        "row {} has child ordinal {} after {}; ordinals must step by one",
                        row, ordinal, prev
                    )))
                }
                Some(_) => {}
            }
        }

        let position = match cursor {
            Some(position) if position < parent_count => position,
            Some(position) => {
                return Err(Error::format(format!(
                    "row {} opens child block {} but only {} parents were given",
                    row,
                    position + 1,
                    parent_count
                )))
            }
            // Rows ahead of the first reset wrap around to the last parent
            None => parent_count.checked_sub(1).ok_or_else(|| {
                Error::format(format!(
                    "row {} has child ordinal {} but no parents were given",
                    row, ordinal
                ))
            })?,
        };
        positions.push(position);
        previous = Some(ordinal);
    }

    Ok(positions)
}

/// Pairs every ordinal with the key of the parent owning its block.
pub fn build_double_index(
    parent_keys: &[String],
    ordinals: &[usize],
    policy: OrdinalPolicy,
) -> Result<Vec<CompositeKey>> {
    let positions = parent_positions(ordinals, parent_keys.len(), policy)?;
    Ok(positions
        .into_iter()
        .zip(ordinals)
        .map(|(position, &ordinal)| CompositeKey::new(parent_keys[position].clone(), ordinal))
        .collect())
}

/// Broadcasts one parent-level value onto every child row of that parent.
pub fn propagate_column<T: Clone>(
    ordinals: &[usize],
    column: &[T],
    policy: OrdinalPolicy,
) -> Result<Vec<T>> {
    let positions = parent_positions(ordinals, column.len(), policy)?;
    Ok(positions.into_iter().map(|position| column[position].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resets_open_new_parents() {
        let index =
            build_double_index(&keys(&["a", "b", "c"]), &[0, 1, 2, 0, 0, 1], OrdinalPolicy::Strict)
                .unwrap();
        let pairs: Vec<(&str, usize)> =
            index.iter().map(|k| (k.event.as_str(), k.ordinal)).collect();
        assert_eq!(pairs, vec![("a", 0), ("a", 1), ("a", 2), ("b", 0), ("c", 0), ("c", 1)]);
    }

    #[test]
    fn test_propagate_column() {
        let dates = vec!["2023-01-01", "2023-02-01"];
        let column = propagate_column(&[0, 1, 0], &dates, OrdinalPolicy::Strict).unwrap();
        assert_eq!(column, vec!["2023-01-01", "2023-01-01", "2023-02-01"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_double_index(&[], &[], OrdinalPolicy::Strict).unwrap().is_empty());
    }

    #[test]
    fn test_strict_rejects_gap() {
        let err = parent_positions(&[0, 2], 1, OrdinalPolicy::Strict).unwrap_err();
        assert!(err.to_string().contains("step by one"));
    }

    #[test]
    fn test_strict_rejects_nonzero_start() {
        assert!(parent_positions(&[1, 2], 1, OrdinalPolicy::Strict).is_err());
    }

    #[test]
    fn test_lenient_follows_cursor() {
        // The gap is ignored and the stray first block lands on the last parent
        let positions = parent_positions(&[1, 0, 3, 0], 3, OrdinalPolicy::Lenient).unwrap();
        assert_eq!(positions, vec![2, 0, 0, 1]);
    }

    #[test]
    fn test_lenient_stray_block_without_parents() {
        assert!(parent_positions(&[2], 0, OrdinalPolicy::Lenient).is_err());
    }

    #[test]
    fn test_running_out_of_parents_fails_in_both_modes() {
        for policy in [OrdinalPolicy::Strict, OrdinalPolicy::Lenient] {
            assert!(parent_positions(&[0, 0, 0], 2, policy).is_err());
        }
    }
}
