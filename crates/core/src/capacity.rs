// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Course capacity.
//!
//! Availability is expressed in places and hours. A place is one
//! participant for one unit of the course:
//!
//! - collective courses: one seat in a subgroup for one session
//! - private courses: one participant for one course duration with one monitor
//!
//! Data gaps (no dates in range, no subgroups, no monitors, unparseable
//! durations) produce a zeroed result and a warning, never an error.

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::repository::{DateRange, SchedulingRepository};
use crate::season::{opening_hours_on, season_range};
use serde::{Deserialize, Serialize};
use skischool_domain::{
    BookingUser, ClockTime, Course, CourseDate, CourseKind, Monitor, TimeRange,
    parse_duration_seconds, parse_interval_seconds, seconds_to_hours,
};
use std::collections::{HashMap, HashSet};
use time::Date;
use tracing::{debug, warn};

/// Monitors grouped by the sports they are certified for.
pub type MonitorsBySport = HashMap<i64, Vec<Monitor>>;

/// Capacity of a course over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseAvailability {
    /// Places consumed by bookings of this course.
    pub booked_places: f64,
    /// Hours consumed by bookings of this course.
    pub booked_hours: f64,
    /// Places still sellable.
    pub available_places: f64,
    /// Places offered in the range.
    pub total_places: f64,
    /// Hours offered in the range.
    pub total_hours: f64,
    /// Hours still sellable.
    pub available_hours: f64,
}

/// Groups active monitors by each sport they hold a certification for.
#[must_use]
pub fn group_monitors_by_sport(monitors: &[Monitor]) -> MonitorsBySport {
    let mut grouped: MonitorsBySport = HashMap::new();
    for monitor in monitors.iter().filter(|m| m.active_school) {
        for authorization in &monitor.sports {
            grouped
                .entry(authorization.sport_id)
                .or_default()
                .push(monitor.clone());
        }
    }
    grouped
}

/// Computes the availability of a course.
///
/// # Arguments
///
/// * `repo` - The scheduling repository
/// * `config` - Engine configuration
/// * `course` - The course, with its dates and subgroups
/// * `monitors_by_sport` - The school's monitors grouped by sport
/// * `range` - Dates to consider; defaults to the season active on `today`,
///   or every course date when no season is active
/// * `weekends_only` - Only consider Saturday and Sunday dates
/// * `today` - The reference date
///
/// # Errors
///
/// Returns an error if the course type is unknown or the repository fails.
pub fn compute_availability<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    course: &Course,
    monitors_by_sport: &MonitorsBySport,
    range: Option<DateRange>,
    weekends_only: bool,
    today: Date,
) -> Result<CourseAvailability, CoreError> {
    let kind: CourseKind = course.kind()?;

    let range: Option<DateRange> = match range {
        Some(range) => Some(range),
        None => season_range(repo, course.school_id, today)?,
    };

    let mut dates: Vec<&CourseDate> = course
        .dates
        .iter()
        .filter(|d| range.is_none_or(|r| r.contains(d.date)))
        .filter(|d| !weekends_only || d.is_weekend())
        .collect();
    dates.sort_by_key(|d| (d.date, d.hour_start, d.id));

    if dates.is_empty() {
        warn!(course_id = course.id, ?range, weekends_only, "No course dates in range");
        return Ok(CourseAvailability::default());
    }

    let availability: CourseAvailability = match kind {
        CourseKind::FixedCollective => fixed_collective(repo, course, &dates, range)?,
        CourseKind::FlexibleCollective => flexible_collective(repo, course, &dates, range)?,
        CourseKind::FixedPrivate => {
            let unit_seconds: u32 = parse_duration_seconds(&course.duration);
            private(repo, config, course, &dates, monitors_by_sport, unit_seconds)?
        }
        CourseKind::FlexiblePrivate => {
            let unit_seconds: u32 = shortest_priced_interval_seconds(course);
            private(repo, config, course, &dates, monitors_by_sport, unit_seconds)?
        }
    };

    debug!(
        course_id = course.id,
        ?kind,
        dates = dates.len(),
        total_places = availability.total_places,
        available_places = availability.available_places,
        "Computed course availability"
    );
    Ok(availability)
}

/// Counts the booking users holding a place in a subgroup of a course.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub fn count_subgroup_bookings<R: SchedulingRepository + ?Sized>(
    repo: &R,
    subgroup_id: i64,
    course_id: i64,
) -> Result<u32, CoreError> {
    let count: usize = repo
        .booking_users_in_subgroup(subgroup_id)?
        .iter()
        .filter(|bu| bu.course_id == course_id && bu.is_counted())
        .count();
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Fixed collective courses sell the whole set of dates at once, so the
/// first date's subgroups define the capacity and bookings are spread
/// evenly over the dates.
fn fixed_collective<R: SchedulingRepository + ?Sized>(
    repo: &R,
    course: &Course,
    dates: &[&CourseDate],
    range: Option<DateRange>,
) -> Result<CourseAvailability, CoreError> {
    let Some(first) = dates.first() else {
        return Ok(CourseAvailability::default());
    };
    if first.subgroups.is_empty() {
        warn!(
            course_id = course.id,
            course_date_id = first.id,
            "First course date has no subgroups"
        );
        return Ok(CourseAvailability::default());
    }

    let slot_hours: f64 = slot_hours(course.id, first);
    let total_places: f64 = first
        .subgroups
        .iter()
        .map(|s| f64::from(s.max_participants))
        .sum();

    let date_ids: HashSet<i64> = dates.iter().map(|d| d.id).collect();
    let booked_count: usize = repo
        .booking_users_for_course(course.id, range)?
        .iter()
        .filter(|bu| bu.is_counted() && date_ids.contains(&bu.course_date_id))
        .count();

    let date_count: usize = dates.len();
    if date_count == 0 {
        return Ok(CourseAvailability::default());
    }
    let booked_places: f64 = count_as_f64(booked_count) / count_as_f64(date_count);

    Ok(summarize(
        total_places,
        total_places * slot_hours,
        booked_places,
        booked_places * slot_hours,
    ))
}

fn flexible_collective<R: SchedulingRepository + ?Sized>(
    repo: &R,
    course: &Course,
    dates: &[&CourseDate],
    range: Option<DateRange>,
) -> Result<CourseAvailability, CoreError> {
    let booking_users: Vec<BookingUser> = repo.booking_users_for_course(course.id, range)?;

    let mut total_places: f64 = 0.0;
    let mut total_hours: f64 = 0.0;
    let mut booked_places: f64 = 0.0;
    let mut booked_hours: f64 = 0.0;

    for course_date in dates {
        if course_date.subgroups.is_empty() {
            warn!(
                course_id = course.id,
                course_date_id = course_date.id,
                "Course date has no subgroups"
            );
            continue;
        }
        let slot_hours: f64 = slot_hours(course.id, course_date);

        for subgroup in &course_date.subgroups {
            let places: f64 = f64::from(subgroup.max_participants);
            let booked: f64 = count_as_f64(
                booking_users
                    .iter()
                    .filter(|bu| bu.is_counted() && bu.course_subgroup_id == Some(subgroup.id))
                    .count(),
            );
            total_places += places;
            total_hours += places * slot_hours;
            booked_places += booked;
            booked_hours += booked * slot_hours;
        }
    }

    Ok(summarize(total_places, total_hours, booked_places, booked_hours))
}

/// Private courses are limited by monitor time.
///
/// `unit_seconds` is the length of one sold unit. Each date offers
/// `monitors / unit_hours` places per hour of the slot, times the maximum
/// participants per place. Bookings of this course consume places; other
/// courses' bookings and blocking non-working days on the same monitors
/// reduce what remains available without changing the total.
fn private<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    course: &Course,
    dates: &[&CourseDate],
    monitors_by_sport: &MonitorsBySport,
    unit_seconds: u32,
) -> Result<CourseAvailability, CoreError> {
    if unit_seconds == 0 {
        warn!(
            course_id = course.id,
            duration = %course.duration,
            "Private course has no usable duration"
        );
        return Ok(CourseAvailability::default());
    }

    let monitor_ids: HashSet<i64> = monitors_by_sport
        .get(&course.sport_id)
        .map(|monitors| monitors.iter().map(|m| m.id).collect())
        .unwrap_or_default();
    if monitor_ids.is_empty() {
        warn!(
            course_id = course.id,
            sport_id = course.sport_id,
            "No monitors for the course's sport"
        );
        return Ok(CourseAvailability::default());
    }

    let unit_hours: f64 = seconds_to_hours(unit_seconds);
    let monitor_count: f64 = count_as_f64(monitor_ids.len());
    let places_per_hour: f64 = monitor_count / unit_hours;
    let max_participants: f64 = f64::from(course.max_participants);

    let mut total_places: f64 = 0.0;
    let mut total_hours: f64 = 0.0;
    let mut booked_places: f64 = 0.0;
    let mut booked_hours: f64 = 0.0;
    let mut stolen_places: f64 = 0.0;
    let mut stolen_hours: f64 = 0.0;

    for course_date in dates {
        let slot: TimeRange = match course_date.hours() {
            Ok(slot) => slot,
            Err(err) => {
                warn!(
                    course_id = course.id,
                    course_date_id = course_date.id,
                    error = %err,
                    "Skipping course date with invalid hours"
                );
                continue;
            }
        };
        let slot_hours: f64 = slot.hours();
        total_places += places_per_hour * slot_hours * max_participants;
        total_hours += monitor_count * slot_hours * max_participants;

        let day_users: Vec<BookingUser> = repo
            .booking_users_on(course.school_id, course_date.date)?
            .into_iter()
            .filter(|bu| {
                bu.is_counted() && bu.monitor_id.is_some_and(|id| monitor_ids.contains(&id))
            })
            .collect();

        let mut other_claims: HashSet<(i64, ClockTime, ClockTime)> = HashSet::new();
        for booking_user in &day_users {
            let Ok(hours) = booking_user.hours() else {
                continue;
            };
            let overlap_seconds: u32 = hours.overlap_seconds(&slot);
            if overlap_seconds == 0 {
                continue;
            }
            let overlap: f64 = seconds_to_hours(overlap_seconds);
            if booking_user.course_id == course.id {
                booked_places += overlap / unit_hours;
                booked_hours += overlap;
                continue;
            }
            let monitor_id: i64 = booking_user.monitor_id.unwrap_or_default();
            if other_claims.insert((monitor_id, hours.start(), hours.end())) {
                stolen_places += overlap / unit_hours * max_participants;
                stolen_hours += overlap * max_participants;
            }
        }

        let opening_hours: TimeRange =
            opening_hours_on(repo, config, course.school_id, course_date.date)?;
        for nwd in repo
            .monitor_nwds_on(course.school_id, course_date.date)?
            .iter()
            .filter(|n| {
                n.covers(course_date.date)
                    && config.is_blocking_subtype(n.subtype)
                    && monitor_ids.contains(&n.monitor_id)
            })
        {
            let blocked: f64 =
                seconds_to_hours(nwd.blocked_hours(opening_hours).overlap_seconds(&slot));
            stolen_places += blocked / unit_hours * max_participants;
            stolen_hours += blocked * max_participants;
        }
    }

    let mut availability: CourseAvailability =
        summarize(total_places, total_hours, booked_places, booked_hours);
    availability.available_places -= stolen_places;
    availability.available_hours -= stolen_hours;
    Ok(availability)
}

/// Returns the unit length of a flexible private course: the first price
/// tier that has a price and a parseable interval.
fn shortest_priced_interval_seconds(course: &Course) -> u32 {
    course
        .price_range
        .iter()
        .filter(|tier| tier.has_price())
        .map(|tier| parse_interval_seconds(&tier.interval))
        .find(|seconds| *seconds > 0)
        .unwrap_or(0)
}

fn slot_hours(course_id: i64, course_date: &CourseDate) -> f64 {
    match course_date.hours() {
        Ok(hours) => hours.hours(),
        Err(err) => {
            warn!(
                course_id,
                course_date_id = course_date.id,
                error = %err,
                "Course date has invalid hours, treating as zero"
            );
            0.0
        }
    }
}

fn summarize(
    total_places: f64,
    total_hours: f64,
    booked_places: f64,
    booked_hours: f64,
) -> CourseAvailability {
    CourseAvailability {
        booked_places,
        booked_hours,
        available_places: total_places - booked_places,
        total_places,
        total_hours,
        available_hours: total_hours - booked_hours,
    }
}

fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}
