//! Range filtering of dated rows

use super::{epoch, parse_date, DateWindow};
use crate::core::Columnar;
use crate::error::{Error, Result};
use crate::flatten::FlatTable;
use chrono::NaiveDateTime;

/// Inclusive range test with open ends defaulting to the epoch and `now`.
pub fn date_in_range(
    date: NaiveDateTime,
    begin: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> bool {
    let begin = begin.unwrap_or_else(epoch);
    let end = end.unwrap_or(now);
    begin <= date && date <= end
}

/// Which rows have a `date` column inside `[begin, end]`.
fn range_mask<'a, T: Columnar + 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    begin: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<bool>> {
    rows.into_iter()
        .enumerate()
        .map(|(position, row)| -> Result<bool> {
            let raw = row
                .column("date")
                .ok_or_else(|| Error::format(format!("row {} has no date", position)))?;
            let date = parse_date(&raw)?;
            Ok(begin <= date && date <= end)
        })
        .collect()
}

/// Rows whose date lies in `[begin, end]`, in their original order.
pub fn select_in_range<T: Columnar + Clone>(
    rows: &[T],
    begin: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<T>> {
    let mask = range_mask(rows, begin, end)?;
    Ok(rows.iter().zip(mask).filter(|(_, keep)| *keep).map(|(row, _)| row.clone()).collect())
}

/// Same as [`select_in_range`] for a flattened table, keeping its columns.
pub fn select_table_in_range(
    table: &FlatTable,
    begin: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<FlatTable> {
    let mut mask = range_mask(table, begin, end)?.into_iter();
    Ok(table.filtered(|_| mask.next().unwrap_or(false)))
}

impl DateWindow {
    pub fn select<T: Columnar + Clone>(&self, rows: &[T]) -> Result<Vec<T>> {
        select_in_range(rows, self.begin, self.end)
    }

    pub fn select_table(&self, table: &FlatTable) -> Result<FlatTable> {
        select_table_in_range(table, self.begin, self.end)
    }
}
