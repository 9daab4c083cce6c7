use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use serde_json::json;
use sitaware::core::Event;
use sitaware::flatten::tags_list_build;
use sitaware::window::{
    clamp_begin, clamp_end, date_in_range, epoch, last_date, parse_date, select_in_range,
    select_table_in_range, validate, Clock, DateWindow, FixedClock,
};
use sitaware::DateError;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn dated_events() -> Vec<Event> {
    ["2022-12-31", "2023-01-01", "2023-01-15 08:30:00", "2023-02-01", "2023-03-10"]
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let tags = json!([{"name": format!("t{}", i)}]);
            Event::from_value(&json!({"id": i, "date": date, "Tag": tags})).unwrap()
        })
        .collect()
}

#[test]
fn test_last_seven_days_from_fixed_clock() {
    let clock = FixedClock(at(2023, 3, 10, 14));
    assert_eq!(last_date(7, clock.now()), at(2023, 3, 3, 0));
    assert_eq!(last_date(0, clock.now()), at(2023, 3, 10, 0));
}

#[test]
fn test_validate_rejects_inverted_window() {
    let now = at(2023, 6, 1, 12);
    let err = validate(Some("2023-01-02"), Some("2023-01-01"), NaiveDateTime::default(), now)
        .unwrap_err();
    assert!(matches!(err, DateError::BeginAfterEnd { .. }));
}

#[test]
fn test_validate_rejects_end_before_retention() {
    let now = at(2023, 6, 1, 12);
    let err = validate(None, Some("2023-05-01"), last_date(7, now), now).unwrap_err();
    assert!(matches!(err, DateError::EndBeforeLast { .. }));
}

#[test]
fn test_future_begin_names_today() {
    let now = at(2023, 6, 1, 12);
    let err = validate(Some("2023-07-01"), None, NaiveDateTime::default(), now).unwrap_err();
    assert!(matches!(err, DateError::BeginInFuture { .. }));
    assert!(err.to_string().contains("2023-06-01"));
}

#[test]
fn test_future_begin_with_offset_is_rejected() {
    // 09:30 at UTC+2
    let now = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap().and_hms_opt(7, 30, 0).unwrap();
    let err = validate(Some("2023-06-01T10:00:00+02:00"), None, epoch(), now).unwrap_err();
    assert!(matches!(err, DateError::BeginInFuture { .. }));

    assert!(validate(Some("2023-06-01T09:00:00+02:00"), None, epoch(), now).is_ok());
}

#[test]
fn test_validate_accepts_windows_on_the_boundaries() {
    let now = at(2023, 6, 1, 12);
    let floor = last_date(7, now);
    assert_eq!(floor, at(2023, 5, 25, 0));

    for (begin, end) in [
        ("2023-05-25 00:00:00", "2023-06-01 12:00:00"),
        ("2023-05-25 00:00:00", "2023-05-25 00:00:00"),
        ("2023-06-01 12:00:00", "2023-06-01 12:00:00"),
        ("2023-05-28", "2023-05-30"),
    ] {
        assert!(
            validate(Some(begin), Some(end), floor, now).is_ok(),
            "rejected [{}, {}]",
            begin,
            end
        );
    }
}

#[test]
fn test_validate_accepts_open_and_equal_bounds() {
    let now = at(2023, 6, 1, 12);
    let floor = NaiveDateTime::default();
    assert!(validate(None, None, floor, now).is_ok());
    assert!(validate(Some("2023-01-01"), Some("2023-01-01"), floor, now).is_ok());
    assert!(validate(Some("2023-01-01"), Some("2030-01-01"), floor, now).is_ok());
}

#[test]
fn test_unparseable_bound_is_a_date_error() {
    let now = at(2023, 6, 1, 12);
    let err = DateWindow::resolve(Some("someday"), None, None, now).unwrap_err();
    assert!(matches!(err, DateError::Unparseable(_)));
}

#[test]
fn test_clamps_only_narrow() {
    let now = at(2023, 6, 1, 12);
    let floor = last_date(30, now);
    for candidate in [at(2020, 1, 1, 0), at(2023, 5, 20, 0), at(2024, 1, 1, 0)] {
        assert!(clamp_begin(candidate, floor) >= candidate);
        assert!(clamp_begin(candidate, floor) >= floor);
        assert!(clamp_end(candidate, now) <= candidate);
        assert!(clamp_end(candidate, now) <= now);
    }
}

#[test]
fn test_clamp_begin_is_monotone_in_the_floor() {
    let now = at(2023, 6, 1, 12);
    let floors = [epoch(), last_date(30, now), last_date(7, now), last_date(0, now)];
    let begins = [at(2020, 1, 1, 0), at(2023, 5, 10, 0), at(2023, 5, 28, 6), at(2023, 6, 1, 8)];

    for begin in begins {
        for pair in floors.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            assert!(lower <= higher);
            assert!(clamp_begin(begin, lower) <= clamp_begin(begin, higher));
        }
    }
}

#[test]
fn test_resolve_clamps_to_retention_and_now() {
    let now = at(2023, 6, 1, 12);
    let window =
        DateWindow::resolve(Some("2023-01-01"), Some("2030-01-01"), Some(7), now).unwrap();
    assert_eq!(window.begin, at(2023, 5, 25, 0));
    assert_eq!(window.end, now);
}

#[test]
fn test_open_window_keeps_everything() {
    let now = at(2023, 6, 1, 12);
    let events = dated_events();
    let window = DateWindow::resolve(None, None, None, now).unwrap();
    assert_eq!(window.select(&events).unwrap(), events);
}

#[test]
fn test_range_is_inclusive() {
    let events = dated_events();
    let kept = select_in_range(&events, at(2023, 1, 1, 0), at(2023, 2, 1, 0)).unwrap();
    let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_filter_is_idempotent() {
    let events = dated_events();
    let (begin, end) = (at(2023, 1, 1, 0), at(2023, 1, 31, 0));
    let once = select_in_range(&events, begin, end).unwrap();
    let twice = select_in_range(&once, begin, end).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_tag_filter_is_idempotent() {
    let tags = tags_list_build(&dated_events()).unwrap();
    let (begin, end) = (at(2023, 1, 1, 0), at(2023, 1, 31, 0));
    let once = select_table_in_range(&tags, begin, end).unwrap();
    let twice = select_table_in_range(&once, begin, end).unwrap();
    assert_eq!(once.len(), 2);
    assert_eq!(once, twice);
    assert_eq!(once.columns(), tags.columns());
}

#[test]
fn test_date_in_range_open_ends() {
    let now = at(2023, 6, 1, 12);
    assert!(date_in_range(at(1999, 1, 1, 0), None, None, now));
    assert!(!date_in_range(at(2023, 6, 2, 0), None, None, now));
    assert!(date_in_range(now, Some(now), Some(now), now));
}

#[test]
fn test_parse_date_accepts_feed_formats() {
    assert_eq!(parse_date("2023-01-15").unwrap(), at(2023, 1, 15, 0));
    assert_eq!(parse_date("January 15, 2023").unwrap(), at(2023, 1, 15, 0));
    assert_eq!(parse_date("2023-01-15T10:00:00+02:00").unwrap(), at(2023, 1, 15, 8));
}
