// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::interval::{ClockTime, TimeRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, Weekday};

/// Course type code for collective courses.
pub const COURSE_TYPE_COLLECTIVE: u8 = 1;
/// Course type code for private courses.
pub const COURSE_TYPE_PRIVATE: u8 = 2;

/// The scheduling and pricing model of a course.
///
/// Combines the stored course type code with the orthogonal flexible flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseKind {
    /// Collective course sold as a whole set of dates at a flat price.
    FixedCollective,
    /// Collective course sold per date, with ordinal-date discounts.
    FlexibleCollective,
    /// Private course with a flat price.
    FixedPrivate,
    /// Private course priced by duration interval and group size.
    FlexiblePrivate,
}

impl CourseKind {
    /// Resolves the kind from the stored type code and flexible flag.
    ///
    /// # Arguments
    ///
    /// * `course_id` - The course identifier, for error reporting
    /// * `course_type` - The stored course type code
    /// * `is_flexible` - Whether the course uses flexible pricing
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCourseType` for unknown type codes.
    pub const fn from_parts(
        course_id: i64,
        course_type: u8,
        is_flexible: bool,
    ) -> Result<Self, DomainError> {
        match (course_type, is_flexible) {
            (COURSE_TYPE_COLLECTIVE, false) => Ok(Self::FixedCollective),
            (COURSE_TYPE_COLLECTIVE, true) => Ok(Self::FlexibleCollective),
            (COURSE_TYPE_PRIVATE, false) => Ok(Self::FixedPrivate),
            (COURSE_TYPE_PRIVATE, true) => Ok(Self::FlexiblePrivate),
            _ => Err(DomainError::InvalidCourseType {
                course_id,
                course_type,
            }),
        }
    }

    /// Returns whether this is a collective (group enrollment) course.
    #[must_use]
    pub const fn is_collective(&self) -> bool {
        matches!(self, Self::FixedCollective | Self::FlexibleCollective)
    }

    /// Returns whether this is a private (per-slot) course.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        matches!(self, Self::FixedPrivate | Self::FlexiblePrivate)
    }
}

/// Lifecycle status shared by bookings and booking users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum BookingStatus {
    /// Created but not yet confirmed.
    #[default]
    Pending,
    /// Confirmed and holding its slot.
    Active,
    /// Cancelled; never counts against capacity or monitor time.
    Cancelled,
}

impl BookingStatus {
    /// Returns the stored status code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Cancelled => 2,
        }
    }
}

impl TryFrom<u8> for BookingStatus {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Active),
            2 => Ok(Self::Cancelled),
            other => Err(DomainError::InvalidStatus(other)),
        }
    }
}

impl From<BookingStatus> for u8 {
    fn from(value: BookingStatus) -> Self {
        value.code()
    }
}

/// A school, the tenant that owns courses, monitors and seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    /// The school identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// IANA timezone in which the school's wall-clock times are declared.
    pub timezone: String,
}

/// A school season, providing the default date range and opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// The season identifier.
    pub id: i64,
    /// The owning school.
    pub school_id: i64,
    /// First day of the season (inclusive).
    pub start_date: Date,
    /// Last day of the season (inclusive).
    pub end_date: Date,
    /// Opening time.
    pub hour_start: ClockTime,
    /// Closing time.
    pub hour_end: ClockTime,
}

impl Season {
    /// Returns whether `date` falls within the season.
    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns the season's daily opening hours.
    ///
    /// # Errors
    ///
    /// Returns an error if the closing time is before the opening time.
    pub fn opening_hours(&self) -> Result<TimeRange, DomainError> {
        TimeRange::new(self.hour_start, self.hour_end)
    }
}

/// One duration tier of a flexible private course's price table.
///
/// `prices` maps a group size (number of participants sharing the slot)
/// to a price. Missing or `null` entries mean no price is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    /// The interval label, e.g. `"1h 30m"`.
    pub interval: String,
    /// Price per group size.
    #[serde(default)]
    pub prices: BTreeMap<u32, Option<f64>>,
}

impl PriceTier {
    /// Returns the price for a group of `participants`, if defined.
    #[must_use]
    pub fn price_for(&self, participants: u32) -> Option<f64> {
        self.prices.get(&participants).copied().flatten()
    }

    /// Returns whether any group size has a price.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.prices.values().any(Option::is_some)
    }
}

/// An ordinal-date discount on a flexible collective course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// The 1-based ordinal of the client's date this discount applies to.
    pub day: u32,
    /// Reduction in percent.
    pub reduction: f64,
}

/// A purchasable extra in a course's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseExtra {
    /// The extra identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: f64,
}

/// A course offered by a school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// The course identifier.
    pub id: i64,
    /// The owning school.
    pub school_id: i64,
    /// The sport taught.
    pub sport_id: i64,
    /// The station where the course takes place, if any.
    #[serde(default)]
    pub station_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Stored type code (`1` collective, `2` private).
    pub course_type: u8,
    /// Whether pricing is flexible.
    #[serde(default)]
    pub is_flexible: bool,
    /// Nominal duration of one slot (private) or one session.
    #[serde(default)]
    pub duration: String,
    /// Maximum participants per place.
    pub max_participants: u32,
    /// Flat price.
    #[serde(default)]
    pub price: f64,
    /// Duration/group-size price table for flexible private courses.
    #[serde(default)]
    pub price_range: Vec<PriceTier>,
    /// Ordinal-date discounts for flexible collective courses.
    #[serde(default)]
    pub discounts: Vec<Discount>,
    /// Extras catalog.
    #[serde(default)]
    pub extras: Vec<CourseExtra>,
    /// Scheduled occurrences.
    #[serde(default)]
    pub dates: Vec<CourseDate>,
}

impl Course {
    /// Returns the course's scheduling and pricing model.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored course type is unknown.
    pub const fn kind(&self) -> Result<CourseKind, DomainError> {
        CourseKind::from_parts(self.id, self.course_type, self.is_flexible)
    }

    /// Looks up an extra in the course catalog.
    #[must_use]
    pub fn extra(&self, extra_id: i64) -> Option<&CourseExtra> {
        self.extras.iter().find(|e| e.id == extra_id)
    }

    /// Looks up a course date by identifier.
    #[must_use]
    pub fn date(&self, course_date_id: i64) -> Option<&CourseDate> {
        self.dates.iter().find(|d| d.id == course_date_id)
    }
}

/// One scheduled occurrence of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDate {
    /// The course date identifier.
    pub id: i64,
    /// The owning course.
    pub course_id: i64,
    /// Calendar date.
    pub date: Date,
    /// Start of the session.
    pub hour_start: ClockTime,
    /// End of the session.
    pub hour_end: ClockTime,
    /// Capacity partitions of this date (collective courses only).
    #[serde(default)]
    pub subgroups: Vec<CourseSubgroup>,
}

impl CourseDate {
    /// Returns the session's time range.
    ///
    /// # Errors
    ///
    /// Returns an error if the session ends before it starts.
    pub fn hours(&self) -> Result<TimeRange, DomainError> {
        TimeRange::new(self.hour_start, self.hour_end)
    }

    /// Returns whether the date falls on a Saturday or Sunday.
    #[must_use]
    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }
}

/// The capacity-bearing partition of a collective course date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSubgroup {
    /// The subgroup identifier.
    pub id: i64,
    /// The owning course.
    pub course_id: i64,
    /// The owning course date.
    pub course_date_id: i64,
    /// The level taught in this subgroup.
    #[serde(default)]
    pub degree_id: Option<i64>,
    /// The assigned monitor, if any.
    #[serde(default)]
    pub monitor_id: Option<i64>,
    /// Maximum participants in this subgroup.
    pub max_participants: u32,
}

/// A booking, the parent of one or more booking users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// The booking identifier.
    pub id: i64,
    /// The owning school.
    pub school_id: i64,
    /// Booking status.
    pub status: BookingStatus,
    /// Whether the client bought cancellation insurance.
    #[serde(default)]
    pub has_cancellation_insurance: bool,
}

/// A quantity of a catalog extra attached to a booking user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUserExtra {
    /// The catalog extra.
    pub course_extra_id: i64,
    /// Quantity purchased.
    pub quantity: u32,
}

/// One client's claim on one time slot.
///
/// This is the atomic unit of both capacity consumption and monitor claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUser {
    /// The booking user identifier. Ascending ids follow booking order.
    pub id: i64,
    /// The parent booking.
    pub booking_id: i64,
    /// The owning school.
    pub school_id: i64,
    /// The booked course.
    pub course_id: i64,
    /// The booked course date.
    pub course_date_id: i64,
    /// The subgroup, for collective courses.
    #[serde(default)]
    pub course_subgroup_id: Option<i64>,
    /// The assigned monitor, if any.
    #[serde(default)]
    pub monitor_id: Option<i64>,
    /// The client taking the slot.
    pub client_id: i64,
    /// Private group identifier shared by participants of one slot.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Calendar date of the slot.
    pub date: Date,
    /// Start of the slot.
    pub hour_start: ClockTime,
    /// End of the slot.
    pub hour_end: ClockTime,
    /// Booking user status.
    pub status: BookingStatus,
    /// Status of the parent booking, as joined by the repository.
    #[serde(default)]
    pub booking_status: BookingStatus,
    /// Purchased extras.
    #[serde(default)]
    pub extras: Vec<BookingUserExtra>,
}

impl BookingUser {
    /// Returns whether this row holds its slot: active, with a parent
    /// booking that is not cancelled.
    #[must_use]
    pub fn is_counted(&self) -> bool {
        self.status == BookingStatus::Active && self.booking_status != BookingStatus::Cancelled
    }

    /// Returns the slot's time range.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot ends before it starts.
    pub fn hours(&self) -> Result<TimeRange, DomainError> {
        TimeRange::new(self.hour_start, self.hour_end)
    }

    /// Returns whether `other` occupies the same private slot: same course,
    /// date, hours, monitor, group, booking and school.
    #[must_use]
    pub fn shares_private_slot(&self, other: &Self) -> bool {
        self.course_id == other.course_id
            && self.date == other.date
            && self.hour_start == other.hour_start
            && self.hour_end == other.hour_end
            && self.monitor_id == other.monitor_id
            && self.group_id == other.group_id
            && self.booking_id == other.booking_id
            && self.school_id == other.school_id
    }
}

/// A monitor's certification to teach a sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSportAuthorization {
    /// The sport.
    pub sport_id: i64,
    /// The highest degree held for this sport.
    pub degree_id: i64,
    /// Rank of that degree within the sport (higher is more qualified).
    pub degree_order: u32,
    /// Whether the monitor may teach adults in this sport.
    #[serde(default)]
    pub allow_adults: bool,
}

/// Number of language slots on a monitor profile.
pub const MONITOR_LANGUAGE_SLOTS: usize = 6;

/// An instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    /// The monitor identifier.
    pub id: i64,
    /// The school the monitor works for.
    pub school_id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the monitor is active at the school.
    #[serde(default)]
    pub active_school: bool,
    /// Spoken languages.
    #[serde(default)]
    pub languages: [Option<i64>; MONITOR_LANGUAGE_SLOTS],
    /// Sport certifications.
    #[serde(default)]
    pub sports: Vec<MonitorSportAuthorization>,
}

impl Monitor {
    /// Returns the certification for `sport_id`, if any.
    #[must_use]
    pub fn authorization_for(&self, sport_id: i64) -> Option<&MonitorSportAuthorization> {
        self.sports.iter().find(|s| s.sport_id == sport_id)
    }

    /// Returns whether any of the first `slots` language slots is in `languages`.
    #[must_use]
    pub fn speaks_any(&self, languages: &[i64], slots: usize) -> bool {
        self.languages
            .iter()
            .take(slots)
            .flatten()
            .any(|lang| languages.contains(lang))
    }

    /// Returns the display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A certification level within a sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
    /// The degree identifier.
    pub id: i64,
    /// The sport this degree belongs to.
    pub sport_id: i64,
    /// Display name.
    pub name: String,
    /// Rank within the sport.
    pub degree_order: u32,
}

/// A monitor's declared unavailability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorNwd {
    /// The block identifier.
    pub id: i64,
    /// The unavailable monitor.
    pub monitor_id: i64,
    /// The owning school.
    pub school_id: i64,
    /// First day of the block (inclusive).
    pub start_date: Date,
    /// Last day of the block (inclusive).
    pub end_date: Date,
    /// Start time; ignored when `full_day`.
    #[serde(default)]
    pub start_time: Option<ClockTime>,
    /// End time; ignored when `full_day`.
    #[serde(default)]
    pub end_time: Option<ClockTime>,
    /// Whether the block spans the school's full opening hours.
    #[serde(default)]
    pub full_day: bool,
    /// Block subtype code.
    pub subtype: u8,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

impl MonitorNwd {
    /// Returns whether the block covers `date`.
    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns the blocked time range on a covered day.
    ///
    /// Full-day blocks, and blocks missing either time, span `opening_hours`.
    #[must_use]
    pub fn blocked_hours(&self, opening_hours: TimeRange) -> TimeRange {
        if self.full_day {
            return opening_hours;
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => TimeRange::new(start, end).unwrap_or(opening_hours),
            _ => opening_hours,
        }
    }
}

/// A non-teaching task assigned to a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorTask {
    /// The task identifier.
    pub id: i64,
    /// The owning school.
    pub school_id: i64,
    /// The assigned monitor, if any.
    #[serde(default)]
    pub monitor_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Calendar date.
    pub date: Date,
    /// Start time.
    pub hour_start: ClockTime,
    /// End time.
    pub hour_end: ClockTime,
}

/// A client's level in a sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSportDegree {
    /// The sport.
    pub sport_id: i64,
    /// The degree reached.
    pub degree_id: i64,
}

/// A client (participant) of the school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// The client identifier.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    #[serde(default)]
    pub birth_date: Option<Date>,
    /// Levels per sport.
    #[serde(default)]
    pub degrees: Vec<ClientSportDegree>,
}

impl Client {
    /// Returns the client's degree for `sport_id`, if recorded.
    #[must_use]
    pub fn degree_for(&self, sport_id: i64) -> Option<i64> {
        self.degrees
            .iter()
            .find(|d| d.sport_id == sport_id)
            .map(|d| d.degree_id)
    }

    /// Returns the display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
