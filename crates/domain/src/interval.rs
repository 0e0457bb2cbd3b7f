// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time-of-day and duration arithmetic.
//!
//! Course schedules, booking slots and non-working-day blocks all describe
//! time as wall-clock offsets from midnight on an implicit common day. This
//! module provides the shared vocabulary for them:
//!
//! - [`ClockTime`]: a parsed `HH:mm` / `HH:mm:ss` value
//! - [`TimeRange`]: a half-open `[start, end)` range of clock times
//! - duration parsers for the two string encodings found in course data
//! - the fixed table of interval labels used as private price-tier keys
//!
//! ## Invariants
//!
//! - Cross-midnight ranges are not representable; `end >= start` always
//! - Two ranges overlap iff `s1 < e2 && s2 < e1` (touching ranges do not)
//! - Unparseable duration strings resolve to zero seconds, never an error

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Time;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::warn;

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3_600;

/// Canonical interval lengths (in minutes) and their price-tier labels.
const INTERVAL_LABELS: [(u32, &str); 9] = [
    (15, "15m"),
    (30, "30m"),
    (45, "45m"),
    (60, "1h"),
    (75, "1h 15m"),
    (90, "1h 30m"),
    (120, "2h"),
    (180, "3h"),
    (240, "4h"),
];

const CLOCK_FORMAT_SECONDS: &[BorrowedFormatItem<'_>] =
    format_description!("[hour padding:none]:[minute]:[second]");
const CLOCK_FORMAT_MINUTES: &[BorrowedFormatItem<'_>] =
    format_description!("[hour padding:none]:[minute]");
const DISPLAY_FORMAT_SECONDS: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second]");
const DISPLAY_FORMAT_MINUTES: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

/// A wall-clock time of day with whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    time: Time,
}

impl ClockTime {
    /// Midnight (`00:00`).
    pub const MIDNIGHT: Self = Self {
        time: Time::MIDNIGHT,
    };

    /// Creates a `ClockTime` from hour, minute and second components.
    ///
    /// Returns `None` if any component is out of range.
    #[must_use]
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        let time: Time = Time::from_hms(
            u8::try_from(hour).ok()?,
            u8::try_from(minute).ok()?,
            u8::try_from(second).ok()?,
        )
        .ok()?;
        Some(Self { time })
    }

    /// Parses `HH:mm` or `HH:mm:ss`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidClockTime` if the value is not a valid
    /// time of day in either format.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        Time::parse(trimmed, CLOCK_FORMAT_SECONDS)
            .or_else(|_| Time::parse(trimmed, CLOCK_FORMAT_MINUTES))
            .map(|time| Self { time })
            .map_err(|_| DomainError::InvalidClockTime(value.to_string()))
    }

    /// Returns the offset from midnight in seconds.
    #[must_use]
    pub fn seconds_from_midnight(&self) -> u32 {
        let (hour, minute, second) = self.time.as_hms();
        u32::from(hour) * SECONDS_PER_HOUR
            + u32::from(minute) * SECONDS_PER_MINUTE
            + u32::from(second)
    }

    /// Returns the hour component.
    #[must_use]
    pub fn hour(&self) -> u32 {
        u32::from(self.time.hour())
    }

    /// Returns the minute component.
    #[must_use]
    pub fn minute(&self) -> u32 {
        u32::from(self.time.minute())
    }

    /// Returns the second component.
    #[must_use]
    pub fn second(&self) -> u32 {
        u32::from(self.time.second())
    }

    /// Returns the underlying `time::Time`.
    #[must_use]
    pub const fn as_time(&self) -> Time {
        self.time
    }
}

impl FromStr for ClockTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let format: &[BorrowedFormatItem<'_>] = if self.time.second() == 0 {
            DISPLAY_FORMAT_MINUTES
        } else {
            DISPLAY_FORMAT_SECONDS
        };
        let formatted: String = self.time.format(format).map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}

/// Returns the signed difference `end - start` in seconds.
///
/// Negative results indicate an end before the start; callers that need
/// error detection must check the sign.
#[must_use]
pub fn seconds_between(start: ClockTime, end: ClockTime) -> i64 {
    i64::from(end.seconds_from_midnight()) - i64::from(start.seconds_from_midnight())
}

/// Parses two time-of-day strings and returns their signed difference in seconds.
///
/// Returns `None` if either value cannot be parsed.
#[must_use]
pub fn time_difference_seconds(start: &str, end: &str) -> Option<i64> {
    let start: ClockTime = ClockTime::parse(start).ok()?;
    let end: ClockTime = ClockTime::parse(end).ok()?;
    Some(seconds_between(start, end))
}

/// A half-open range of clock times, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: ClockTime,
    end: ClockTime,
}

impl TimeRange {
    /// The empty range at midnight.
    pub const EMPTY: Self = Self {
        start: ClockTime::MIDNIGHT,
        end: ClockTime::MIDNIGHT,
    };

    /// Creates a new `TimeRange`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if `end` is before `start`.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidTimeRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a range from two time-of-day strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not a valid time or the range is inverted.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Self::new(ClockTime::parse(start)?, ClockTime::parse(end)?)
    }

    /// Returns the start of the range.
    #[must_use]
    pub const fn start(&self) -> ClockTime {
        self.start
    }

    /// Returns the (exclusive) end of the range.
    #[must_use]
    pub const fn end(&self) -> ClockTime {
        self.end
    }

    /// Returns the length of the range in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.end.seconds_from_midnight() - self.start.seconds_from_midnight()
    }

    /// Returns the length of the range in whole minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_seconds() / SECONDS_PER_MINUTE
    }

    /// Returns the length of the range in fractional hours.
    #[must_use]
    pub fn hours(&self) -> f64 {
        seconds_to_hours(self.duration_seconds())
    }

    /// Returns true if the two ranges share any instant.
    ///
    /// A range ending exactly when the other starts does not overlap it.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the number of seconds the two ranges have in common.
    #[must_use]
    pub fn overlap_seconds(&self, other: &Self) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }
        let start: ClockTime = self.start.max(other.start);
        let end: ClockTime = self.end.min(other.end);
        end.seconds_from_midnight() - start.seconds_from_midnight()
    }

    /// Returns true if `time` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, time: ClockTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Converts seconds to fractional hours.
#[must_use]
pub fn seconds_to_hours(seconds: u32) -> f64 {
    f64::from(seconds) / f64::from(SECONDS_PER_HOUR)
}

/// Parses a course duration string into seconds.
///
/// Accepted encodings:
/// - `"<N>h"` and `"<N>h <M>min"`
/// - `"<N>min"`
/// - `"HH:mm:ss"` (and `"HH:mm"`)
///
/// Unparseable values resolve to zero seconds and are logged.
#[must_use]
pub fn parse_duration_seconds(value: &str) -> u32 {
    let trimmed: &str = value.trim();
    let parsed: Option<u32> = if trimmed.contains(':') {
        parse_colon_duration(trimmed)
    } else {
        scan_unit_tokens(trimmed, false)
    };

    parsed.unwrap_or_else(|| {
        warn!(value, "Unparseable course duration, treating as zero");
        0
    })
}

/// Parses a flexible-pricing interval string into seconds.
///
/// Accepts `"30m"`, `"1h 15m"`, `"2h"` and the `"min"` suffix. Unlike
/// [`parse_duration_seconds`] a bare `m` means minutes.
///
/// Unparseable values resolve to zero seconds and are logged.
#[must_use]
pub fn parse_interval_seconds(value: &str) -> u32 {
    scan_unit_tokens(value.trim(), true).unwrap_or_else(|| {
        warn!(value, "Unparseable price interval, treating as zero");
        0
    })
}

/// Returns the price-tier label for a canonical interval length in minutes.
#[must_use]
pub fn interval_label_for_minutes(minutes: u32) -> Option<&'static str> {
    INTERVAL_LABELS
        .iter()
        .find(|(m, _)| *m == minutes)
        .map(|(_, label)| *label)
}

/// Returns the price-tier label for an interval length in seconds.
///
/// Lengths that are not whole minutes, or not in the canonical table,
/// have no label.
#[must_use]
pub fn interval_label_for_seconds(seconds: u32) -> Option<&'static str> {
    if seconds % SECONDS_PER_MINUTE != 0 {
        return None;
    }
    interval_label_for_minutes(seconds / SECONDS_PER_MINUTE)
}

/// Returns the canonical interval length in minutes for a price-tier label.
#[must_use]
pub fn minutes_for_interval_label(label: &str) -> Option<u32> {
    let label: &str = label.trim();
    INTERVAL_LABELS
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(m, _)| *m)
}

fn parse_colon_duration(value: &str) -> Option<u32> {
    ClockTime::parse(value)
        .ok()
        .map(|time| time.seconds_from_midnight())
}

/// Scans `<number><unit>` tokens, optionally separated by whitespace.
///
/// Units are `h` and `min`; a bare `m` is accepted only when `allow_bare_m`.
fn scan_unit_tokens(value: &str, allow_bare_m: bool) -> Option<u32> {
    let mut chars = value.chars().peekable();
    let mut total: u32 = 0;
    let mut saw_token: bool = false;

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut number: u32 = 0;
        let mut digits: usize = 0;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            number = number.checked_mul(10)?.checked_add(digit)?;
            digits += 1;
            chars.next();
        }
        if digits == 0 {
            return None;
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let mut unit: String = String::new();
        while let Some(c) = chars.peek().filter(|c| c.is_ascii_alphabetic()) {
            unit.push(c.to_ascii_lowercase());
            chars.next();
        }

        let multiplier: u32 = match unit.as_str() {
            "h" => SECONDS_PER_HOUR,
            "min" => SECONDS_PER_MINUTE,
            "m" if allow_bare_m => SECONDS_PER_MINUTE,
            _ => return None,
        };
        total = total.checked_add(number.checked_mul(multiplier)?)?;
        saw_token = true;
    }

    saw_token.then_some(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_rejects_unit_without_number() {
        assert_eq!(scan_unit_tokens("h", true), None);
    }

    #[test]
    fn test_scan_rejects_trailing_number_without_unit() {
        assert_eq!(scan_unit_tokens("1h 30", true), None);
    }

    #[test]
    fn test_scan_accepts_compact_tokens() {
        assert_eq!(scan_unit_tokens("1h30min", false), Some(5_400));
    }

    #[test]
    fn test_colon_duration_rejects_out_of_range_minutes() {
        assert_eq!(parse_colon_duration("01:75:00"), None);
    }
}
