// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monitor eligibility and conflict detection.
//!
//! A monitor is available for a window when they are eligible for the
//! request (sport, level, adults, languages) and hold no competing claim on
//! that date: a booking slot, a blocking non-working day, or a collective
//! subgroup assignment whose hours overlap the window.

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::repository::{SchedulingRepository, SubgroupAssignment};
use crate::season::opening_hours_on;
use serde::{Deserialize, Serialize};
use skischool_domain::{Degree, Monitor, MonitorNwd, TimeRange};
use std::collections::HashSet;
use time::Date;
use tracing::debug;

/// A request for monitors able to teach a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorQuery {
    /// The school.
    pub school_id: i64,
    /// The sport to teach.
    pub sport_id: i64,
    /// The lowest acceptable degree, if any.
    #[serde(default)]
    pub minimum_degree_id: Option<i64>,
    /// The date.
    pub date: Date,
    /// The requested hours.
    pub window: TimeRange,
    /// Whether any participant is an adult.
    #[serde(default)]
    pub adults_present: bool,
    /// Languages spoken by the participants; empty means no constraint.
    #[serde(default)]
    pub client_languages: Vec<i64>,
    /// Booking users whose own claims are ignored, e.g. when editing them.
    #[serde(default)]
    pub ignore_booking_users: Vec<i64>,
}

/// A claim on a monitor's time that competes with a requested window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorClaim {
    /// A booking slot assigned to the monitor.
    Booking {
        monitor_id: i64,
        booking_user_id: i64,
        hours: TimeRange,
    },
    /// A blocking non-working day.
    NonWorkingDay {
        monitor_id: i64,
        nwd_id: i64,
        hours: TimeRange,
    },
    /// A collective subgroup the monitor teaches.
    Subgroup {
        monitor_id: i64,
        subgroup_id: i64,
        course_id: i64,
        hours: TimeRange,
    },
}

impl MonitorClaim {
    /// Returns the claimed monitor.
    #[must_use]
    pub const fn monitor_id(&self) -> i64 {
        match self {
            Self::Booking { monitor_id, .. }
            | Self::NonWorkingDay { monitor_id, .. }
            | Self::Subgroup { monitor_id, .. } => *monitor_id,
        }
    }
}

/// Collects every claim on a school's monitors that overlaps a window.
///
/// # Arguments
///
/// * `repo` - The scheduling repository
/// * `config` - Engine configuration
/// * `school_id` - The school
/// * `date` - The date
/// * `window` - The requested hours
/// * `ignore_booking_users` - Booking users whose claims are skipped
///
/// # Errors
///
/// Returns an error if the repository fails.
pub fn collect_monitor_claims<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    school_id: i64,
    date: Date,
    window: TimeRange,
    ignore_booking_users: &[i64],
) -> Result<Vec<MonitorClaim>, CoreError> {
    let mut claims: Vec<MonitorClaim> =
        booking_claims(repo, school_id, date, window, ignore_booking_users)?;
    claims.extend(nwd_claims(repo, config, school_id, date, window)?);

    let assignments: Vec<SubgroupAssignment> = repo.subgroup_assignments_on(school_id, date)?;
    claims.extend(assignments.into_iter().filter_map(|a| {
        let monitor_id: i64 = a.monitor_id?;
        a.hours.overlaps(&window).then_some(MonitorClaim::Subgroup {
            monitor_id,
            subgroup_id: a.subgroup_id,
            course_id: a.course_id,
            hours: a.hours,
        })
    }));

    Ok(claims)
}

/// Finds the monitors eligible for a request with no competing claim.
///
/// Results keep the school's monitor order.
///
/// # Errors
///
/// Returns `CoreError::DegreeNotFound` if the minimum degree does not exist,
/// or an error if the repository fails.
pub fn find_available_monitors<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    query: &MonitorQuery,
) -> Result<Vec<Monitor>, CoreError> {
    let minimum_order: u32 = match query.minimum_degree_id {
        Some(degree_id) => {
            let degree: Degree = repo
                .degree(degree_id)?
                .ok_or(CoreError::DegreeNotFound(degree_id))?;
            degree.degree_order
        }
        None => 0,
    };

    let eligible: Vec<Monitor> = repo
        .monitors_for_school(query.school_id)?
        .into_iter()
        .filter(|m| is_eligible(m, query, minimum_order, config.max_language_slots))
        .collect();

    let busy: HashSet<i64> = collect_monitor_claims(
        repo,
        config,
        query.school_id,
        query.date,
        query.window,
        &query.ignore_booking_users,
    )?
    .iter()
    .map(MonitorClaim::monitor_id)
    .collect();

    let available: Vec<Monitor> = eligible
        .into_iter()
        .filter(|m| !busy.contains(&m.id))
        .collect();

    debug!(
        school_id = query.school_id,
        sport_id = query.sport_id,
        date = %query.date,
        window = %query.window,
        busy = busy.len(),
        available = available.len(),
        "Resolved available monitors"
    );
    Ok(available)
}

/// Returns whether one monitor has a booking or a blocking non-working day
/// overlapping the window.
///
/// Subgroup assignments are not checked.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub fn is_monitor_busy<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    monitor_id: i64,
    school_id: i64,
    date: Date,
    window: TimeRange,
    ignore_booking_users: &[i64],
) -> Result<bool, CoreError> {
    let busy: bool = booking_claims(repo, school_id, date, window, ignore_booking_users)?
        .iter()
        .chain(nwd_claims(repo, config, school_id, date, window)?.iter())
        .any(|claim| claim.monitor_id() == monitor_id);
    debug!(monitor_id, %date, %window, busy, "Checked monitor");
    Ok(busy)
}

fn is_eligible(
    monitor: &Monitor,
    query: &MonitorQuery,
    minimum_order: u32,
    language_slots: usize,
) -> bool {
    if !monitor.active_school {
        return false;
    }
    let Some(authorization) = monitor.authorization_for(query.sport_id) else {
        return false;
    };
    if authorization.degree_order < minimum_order {
        return false;
    }
    if query.adults_present && !authorization.allow_adults {
        return false;
    }
    query.client_languages.is_empty() || monitor.speaks_any(&query.client_languages, language_slots)
}

fn booking_claims<R: SchedulingRepository + ?Sized>(
    repo: &R,
    school_id: i64,
    date: Date,
    window: TimeRange,
    ignore_booking_users: &[i64],
) -> Result<Vec<MonitorClaim>, CoreError> {
    Ok(repo
        .booking_users_on(school_id, date)?
        .into_iter()
        .filter(|bu| bu.is_counted() && !ignore_booking_users.contains(&bu.id))
        .filter_map(|bu| {
            let monitor_id: i64 = bu.monitor_id?;
            let hours: TimeRange = bu.hours().ok()?;
            hours.overlaps(&window).then_some(MonitorClaim::Booking {
                monitor_id,
                booking_user_id: bu.id,
                hours,
            })
        })
        .collect())
}

/// Full-day blocks conflict with any window; other blocks only when they
/// overlap it. Blocks without times span the day's opening hours.
fn nwd_claims<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    school_id: i64,
    date: Date,
    window: TimeRange,
) -> Result<Vec<MonitorClaim>, CoreError> {
    let nwds: Vec<MonitorNwd> = repo
        .monitor_nwds_on(school_id, date)?
        .into_iter()
        .filter(|n| n.covers(date) && config.is_blocking_subtype(n.subtype))
        .collect();
    if nwds.is_empty() {
        return Ok(Vec::new());
    }

    let opening_hours: TimeRange = opening_hours_on(repo, config, school_id, date)?;
    Ok(nwds
        .into_iter()
        .filter_map(|n| {
            let hours: TimeRange = n.blocked_hours(opening_hours);
            (n.full_day || hours.overlaps(&window)).then_some(MonitorClaim::NonWorkingDay {
                monitor_id: n.monitor_id,
                nwd_id: n.id,
                hours,
            })
        })
        .collect())
}
