// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ClockTime, DomainError, TimeRange, interval_label_for_minutes, interval_label_for_seconds,
    minutes_for_interval_label, parse_duration_seconds, parse_interval_seconds, seconds_between,
    time_difference_seconds,
};

use time::macros::time;

const CANONICAL_MINUTES: [u32; 9] = [15, 30, 45, 60, 75, 90, 120, 180, 240];

fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::parse(start, end).unwrap()
}

#[test]
fn test_clock_time_parses_both_formats() {
    let short: ClockTime = ClockTime::parse("09:30").unwrap();
    let long: ClockTime = ClockTime::parse("09:30:15").unwrap();

    assert_eq!(short.seconds_from_midnight(), 9 * 3_600 + 30 * 60);
    assert_eq!(long.seconds_from_midnight(), 9 * 3_600 + 30 * 60 + 15);
    assert_eq!(long.hour(), 9);
    assert_eq!(long.minute(), 30);
    assert_eq!(long.second(), 15);
}

#[test]
fn test_clock_time_accepts_single_digit_hour() {
    let time: ClockTime = ClockTime::parse("9:05").unwrap();
    assert_eq!(time.to_string(), "09:05");
}

#[test]
fn test_clock_time_wraps_time_of_day() {
    let parsed: ClockTime = ClockTime::parse(" 9:05:07 ").unwrap();

    assert_eq!(parsed.as_time(), time!(09:05:07));
    assert_eq!(parsed.to_string(), "09:05:07");
    assert_eq!(ClockTime::MIDNIGHT.as_time(), time!(00:00));
    assert!(ClockTime::MIDNIGHT < parsed);
}

#[test]
fn test_clock_time_rejects_out_of_range_values() {
    assert!(ClockTime::parse("24:00").is_err());
    assert!(ClockTime::parse("10:60").is_err());
    assert!(ClockTime::parse("10:00:60").is_err());
}

#[test]
fn test_clock_time_rejects_garbage() {
    let result: Result<ClockTime, DomainError> = ClockTime::parse("noon");
    assert_eq!(
        result,
        Err(DomainError::InvalidClockTime(String::from("noon")))
    );
    assert!(ClockTime::parse("10").is_err());
    assert!(ClockTime::parse("10:00:00:00").is_err());
    assert!(ClockTime::parse("-1:00").is_err());
}

#[test]
fn test_clock_time_display_keeps_seconds_when_present() {
    assert_eq!(ClockTime::parse("14:00:00").unwrap().to_string(), "14:00");
    assert_eq!(ClockTime::parse("14:00:05").unwrap().to_string(), "14:00:05");
}

#[test]
fn test_clock_time_serde_uses_strings() {
    let time: ClockTime = serde_json::from_str("\"08:45\"").unwrap();
    assert_eq!(time, ClockTime::from_hms(8, 45, 0).unwrap());
    assert_eq!(serde_json::to_string(&time).unwrap(), "\"08:45\"");
    assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
}

#[test]
fn test_seconds_between_is_signed() {
    let nine: ClockTime = ClockTime::parse("09:00").unwrap();
    let half_past_ten: ClockTime = ClockTime::parse("10:30").unwrap();

    assert_eq!(seconds_between(nine, half_past_ten), 5_400);
    assert_eq!(seconds_between(half_past_ten, nine), -5_400);
}

#[test]
fn test_time_difference_seconds_mixed_formats() {
    assert_eq!(time_difference_seconds("09:00", "09:00:30"), Some(30));
    assert_eq!(time_difference_seconds("11:00:00", "10:00"), Some(-3_600));
    assert_eq!(time_difference_seconds("11:00", "later"), None);
}

#[test]
fn test_time_range_rejects_inverted_bounds() {
    let result: Result<TimeRange, DomainError> = TimeRange::parse("11:00", "10:00");
    assert!(matches!(result, Err(DomainError::InvalidTimeRange { .. })));
}

#[test]
fn test_time_range_duration() {
    let slot: TimeRange = range("09:00", "10:30");
    assert_eq!(slot.duration_seconds(), 5_400);
    assert_eq!(slot.duration_minutes(), 90);
    assert!((slot.hours() - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_overlap_is_symmetric() {
    let ranges: Vec<TimeRange> = vec![
        range("08:00", "09:00"),
        range("08:30", "10:00"),
        range("09:00", "11:00"),
        range("09:30", "10:30"),
        range("10:59", "11:00"),
        range("11:00", "13:00"),
        range("07:00", "18:00"),
    ];

    for a in &ranges {
        for b in &ranges {
            assert_eq!(a.overlaps(b), b.overlaps(a), "{a} vs {b}");
            assert_eq!(a.overlap_seconds(b), b.overlap_seconds(a), "{a} vs {b}");
        }
    }
}

#[test]
fn test_touching_ranges_do_not_overlap() {
    let morning: TimeRange = range("09:00", "11:00");
    let midday: TimeRange = range("11:00", "13:00");

    assert!(!morning.overlaps(&midday));
    assert_eq!(morning.overlap_seconds(&midday), 0);
}

#[test]
fn test_contained_range_overlaps() {
    let booking: TimeRange = range("09:00", "11:00");
    let window: TimeRange = range("09:30", "10:30");

    assert!(booking.overlaps(&window));
    assert_eq!(booking.overlap_seconds(&window), 3_600);
}

#[test]
fn test_partial_overlap_seconds() {
    let a: TimeRange = range("09:00", "10:00");
    let b: TimeRange = range("09:45", "12:00");
    assert_eq!(a.overlap_seconds(&b), 900);
}

#[test]
fn test_contains_is_half_open() {
    let slot: TimeRange = range("09:00", "10:00");
    assert!(slot.contains(ClockTime::parse("09:00").unwrap()));
    assert!(slot.contains(ClockTime::parse("09:59:59").unwrap()));
    assert!(!slot.contains(ClockTime::parse("10:00").unwrap()));
}

#[test]
fn test_parse_duration_hour_and_minute_encodings() {
    assert_eq!(parse_duration_seconds("1h"), 3_600);
    assert_eq!(parse_duration_seconds("2h 30min"), 9_000);
    assert_eq!(parse_duration_seconds("45min"), 2_700);
    assert_eq!(parse_duration_seconds(" 3h "), 10_800);
}

#[test]
fn test_parse_duration_colon_encoding() {
    assert_eq!(parse_duration_seconds("01:30:00"), 5_400);
    assert_eq!(parse_duration_seconds("00:45:30"), 2_730);
    assert_eq!(parse_duration_seconds("02:00"), 7_200);
}

#[test]
fn test_parse_duration_unparseable_is_zero() {
    assert_eq!(parse_duration_seconds(""), 0);
    assert_eq!(parse_duration_seconds("all day"), 0);
    assert_eq!(parse_duration_seconds("1x"), 0);
    // The course-duration grammar does not accept a bare `m`.
    assert_eq!(parse_duration_seconds("30m"), 0);
}

#[test]
fn test_parse_interval_encodings() {
    assert_eq!(parse_interval_seconds("30m"), 1_800);
    assert_eq!(parse_interval_seconds("1h 15m"), 4_500);
    assert_eq!(parse_interval_seconds("2h"), 7_200);
    assert_eq!(parse_interval_seconds("1h 30min"), 5_400);
}

#[test]
fn test_parse_interval_unparseable_is_zero() {
    assert_eq!(parse_interval_seconds(""), 0);
    assert_eq!(parse_interval_seconds("01:00:00"), 0);
    assert_eq!(parse_interval_seconds("quarter"), 0);
}

#[test]
fn test_interval_labels_round_trip() {
    for minutes in CANONICAL_MINUTES {
        let label: &str = interval_label_for_minutes(minutes).unwrap();

        assert_eq!(interval_label_for_seconds(minutes * 60), Some(label));
        assert_eq!(minutes_for_interval_label(label), Some(minutes));
        assert_eq!(parse_interval_seconds(label), minutes * 60);
    }
}

#[test]
fn test_interval_label_values() {
    assert_eq!(interval_label_for_minutes(15), Some("15m"));
    assert_eq!(interval_label_for_minutes(60), Some("1h"));
    assert_eq!(interval_label_for_minutes(75), Some("1h 15m"));
    assert_eq!(interval_label_for_minutes(240), Some("4h"));
}

#[test]
fn test_interval_label_outside_table_is_none() {
    assert_eq!(interval_label_for_minutes(50), None);
    assert_eq!(interval_label_for_minutes(300), None);
    assert_eq!(interval_label_for_seconds(3_601), None);
    assert_eq!(minutes_for_interval_label("5h"), None);
}
