//! Date windows: parsing, validation, normalization and clamping
//!
//! Nothing in here reads the wall clock on its own. Every operation that
//! needs "now" takes it as an argument, and callers obtain it from a
//! [`Clock`] once per evaluation.
//!
//! Every instant is a naive UTC time: inputs carrying an offset are converted,
//! plain dates are taken as UTC, and [`SystemClock`] reads UTC.

pub mod filter;

pub use filter::{date_in_range, select_in_range, select_table_in_range};

use crate::error::DateError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC, the same basis [`parse_date`] converts offsets to.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock pinned to one instant, for reproducible runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 1970-01-01 00:00:00, the begin of an open window.
pub fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parses a human-entered date.
///
/// Timezone-aware inputs are converted to UTC and the offset dropped; plain
/// dates resolve to midnight. A bare integer that is not an 8-digit
/// `YYYYMMDD` date is read as Unix seconds.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime, DateError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc).naive_utc());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        if let Some(dt) = s.parse::<i64>().ok().and_then(|secs| DateTime::from_timestamp(secs, 0)) {
            return Ok(dt.naive_utc());
        }
    }

    Err(DateError::Unparseable(raw.to_string()))
}

/// Fills in an open window: no begin means the epoch, no end means `now`.
pub fn normalize(
    begin: Option<&str>,
    end: Option<&str>,
    now: NaiveDateTime,
) -> Result<(NaiveDateTime, NaiveDateTime), DateError> {
    let begin = begin.map(parse_date).transpose()?.unwrap_or_else(epoch);
    let end = end.map(parse_date).transpose()?.unwrap_or(now);
    Ok((begin, end))
}

/// Rejects windows that make no sense; never corrects them.
///
/// Fails when begin is after end, when end is before `last_allowed`, or when
/// begin lies after `now`.
pub fn validate(
    begin: Option<&str>,
    end: Option<&str>,
    last_allowed: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<(), DateError> {
    let begin_date = begin.map(parse_date).transpose()?;
    let end_date = end.map(parse_date).transpose()?;

    if let (Some(b), Some(e), Some(b_date), Some(e_date)) = (begin, end, begin_date, end_date) {
        if b_date > e_date {
            return Err(DateError::BeginAfterEnd { begin: b.to_string(), end: e.to_string() });
        }
    }

    if let (Some(e), Some(e_date)) = (end, end_date) {
        if e_date < last_allowed {
            return Err(DateError::EndBeforeLast {
                end: e.to_string(),
                last: last_allowed.to_string(),
            });
        }
    }

    if let (Some(b), Some(b_date)) = (begin, begin_date) {
        if b_date > now {
            return Err(DateError::BeginInFuture {
                begin: b.to_string(),
                today: now.date().to_string(),
            });
        }
    }

    Ok(())
}

pub fn clamp_begin(begin: NaiveDateTime, last_allowed: NaiveDateTime) -> NaiveDateTime {
    begin.max(last_allowed)
}

pub fn clamp_end(end: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
    end.min(now)
}

/// Midnight `days` days before `now`.
pub fn last_date(days: u32, now: NaiveDateTime) -> NaiveDateTime {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDateTime::MIN)
        .date()
        .and_time(NaiveTime::MIN)
}

/// A validated, inclusive `[begin, end]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Validates the raw bounds, fills in the open ends, then narrows the
    /// result to `[last_date(last_days), now]`.
    pub fn resolve(
        begin: Option<&str>,
        end: Option<&str>,
        last_days: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<Self, DateError> {
        let last_allowed = last_days.map_or_else(epoch, |days| last_date(days, now));
        validate(begin, end, last_allowed, now)?;
        let (begin, end) = normalize(begin, end, now)?;
        Ok(Self { begin: clamp_begin(begin, last_allowed), end: clamp_end(end, now) })
    }

    pub fn contains(&self, date: NaiveDateTime) -> bool {
        self.begin <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_common_formats() {
        let midnight = at("2023-01-01 00:00:00");
        for raw in [
            "2023-01-01",
            "2023/01/01",
            "20230101",
            "01/01/2023",
            "January 1, 2023",
            "Jan 1, 2023",
            "1 January 2023",
            "2023-01-01T00:00:00Z",
            "2023-01-01T01:00:00+01:00",
        ] {
            assert_eq!(at(raw), midnight, "{}", raw);
        }
        assert_eq!(at("2023-01-01 12:30"), midnight + Duration::minutes(750));
        assert_eq!(at("1672531200"), midnight);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_date("yesterday-ish"),
            Err(DateError::Unparseable("yesterday-ish".to_string()))
        );
    }

    #[test]
    fn test_normalize_defaults() {
        let now = at("2023-06-15 10:00:00");
        let (begin, end) = normalize(None, None, now).unwrap();
        assert_eq!(begin, epoch());
        assert_eq!(end, now);
    }

    #[test]
    fn test_last_date_truncates_to_midnight() {
        let now = at("2023-06-15 10:42:17.123456");
        assert_eq!(last_date(7, now), at("2023-06-08"));
        assert_eq!(last_date(0, now), at("2023-06-15"));
    }

    #[test]
    fn test_resolve_clamps() {
        let now = at("2023-06-15 10:00:00");
        let window = DateWindow::resolve(Some("2023-01-01"), None, Some(30), now).unwrap();
        assert_eq!(window.begin, at("2023-05-16"));
        assert_eq!(window.end, now);
        assert!(window.contains(at("2023-06-01")));
        assert!(!window.contains(at("2023-05-15 23:59:59")));
    }

    #[test]
    fn test_clamp_end_never_exceeds_now() {
        let now = at("2023-06-15");
        assert_eq!(clamp_end(at("2024-01-01"), now), now);
        assert_eq!(clamp_end(at("2023-01-01"), now), at("2023-01-01"));
    }
}
