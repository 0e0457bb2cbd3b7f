// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar items for the monitor planner.
//!
//! Projects private slots, collective subgroups, non-working days and tasks
//! onto a common item shape. Wall-clock times are declared in the school's
//! timezone; `from` and `to` are the corresponding UTC instants.
//!
//! This module performs no conflict logic.

use crate::capacity::count_subgroup_bookings;
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::repository::{DateRange, SchedulingRepository, SubgroupAssignment};
use crate::season::opening_hours_on;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use skischool_domain::{
    BookingUser, Client, ClockTime, Course, CourseDate, CourseKind, CourseSubgroup, DomainError,
    Monitor, MonitorNwd, MonitorTask, School, TimeRange, private_group_size,
};
use std::collections::{HashMap, HashSet};
use time::Date;
use tracing::{debug, warn};

/// Course, date, start, end, monitor, group and booking of a private slot.
type SlotKey = (i64, Date, ClockTime, ClockTime, Option<i64>, Option<i64>, i64);

/// The kind of a calendar item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarItemType {
    /// A private course slot.
    PrivateCourse,
    /// A collective course subgroup session.
    CollectiveCourse,
    /// A monitor's non-working day.
    NonWorkingDay,
    /// A monitor task.
    Task,
}

/// The row a calendar item is projected from.
#[derive(Debug, Clone, Copy)]
pub enum CalendarSource<'a> {
    /// A private course slot, represented by one of its booking users.
    PrivateSlot {
        /// The private course.
        course: &'a Course,
        /// Any booking user in the slot.
        booking_user: &'a BookingUser,
    },
    /// A collective subgroup on one course date.
    CollectiveGroup {
        /// The collective course.
        course: &'a Course,
        /// The session's course date.
        course_date: &'a CourseDate,
        /// The subgroup taught.
        subgroup: &'a CourseSubgroup,
    },
    /// One day of a non-working-day block.
    NonWorkingDay {
        /// The block.
        nwd: &'a MonitorNwd,
        /// The day projected.
        date: Date,
    },
    /// A monitor task.
    Task(&'a MonitorTask),
}

/// School-level context for projecting items.
#[derive(Debug, Clone)]
pub struct CalendarContext {
    timezone: String,
    tz: Tz,
    opening_hours: TimeRange,
}

impl CalendarContext {
    /// Creates a context for a school.
    ///
    /// # Arguments
    ///
    /// * `school` - The school, whose timezone anchors wall-clock times
    /// * `opening_hours` - Hours substituted for full-day blocks
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTimezone` if the school's timezone is not
    /// a valid IANA identifier.
    pub fn new(school: &School, opening_hours: TimeRange) -> Result<Self, CoreError> {
        let tz: Tz = school
            .timezone
            .parse()
            .map_err(|_| CoreError::InvalidTimezone(school.timezone.clone()))?;
        Ok(Self {
            timezone: school.timezone.clone(),
            tz,
            opening_hours,
        })
    }

    /// Returns a copy of this context with different opening hours.
    #[must_use]
    pub fn with_opening_hours(&self, opening_hours: TimeRange) -> Self {
        Self {
            opening_hours,
            ..self.clone()
        }
    }

    /// Returns the opening hours used for full-day blocks.
    #[must_use]
    pub const fn opening_hours(&self) -> TimeRange {
        self.opening_hours
    }

    /// Converts a wall-clock time on `date` to an RFC 3339 UTC timestamp.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnresolvableLocalTime` if the local time is
    /// ambiguous or does not exist in the school's timezone.
    pub fn to_utc_rfc3339(&self, date: Date, time: ClockTime) -> Result<String, CoreError> {
        let unresolvable = || CoreError::UnresolvableLocalTime {
            date,
            time: time.to_string(),
            timezone: self.timezone.clone(),
        };

        let naive_date: NaiveDate = NaiveDate::from_ymd_opt(
            date.year(),
            u32::from(u8::from(date.month())),
            u32::from(date.day()),
        )
        .ok_or_else(unresolvable)?;
        let naive_time: NaiveTime =
            NaiveTime::from_hms_opt(time.hour(), time.minute(), time.second())
                .ok_or_else(unresolvable)?;

        let local: DateTime<Tz> = self
            .tz
            .from_local_datetime(&naive_date.and_time(naive_time))
            .single()
            .ok_or_else(unresolvable)?;
        Ok(local.with_timezone(&chrono::Utc).to_rfc3339())
    }
}

/// Course fields shown on a calendar item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    /// The course identifier.
    pub id: i64,
    /// The course name.
    pub name: String,
    /// Collective or private, fixed or flexible.
    pub kind: CourseKind,
    /// The sport taught.
    pub sport_id: i64,
    /// The station the course runs at, if any.
    pub station_id: Option<i64>,
}

impl CourseSummary {
    fn from_course(course: &Course) -> Result<Self, CoreError> {
        Ok(Self {
            id: course.id,
            name: course.name.clone(),
            kind: course.kind()?,
            sport_id: course.sport_id,
            station_id: course.station_id,
        })
    }
}

/// Monitor fields shown on a calendar item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSummary {
    /// The monitor identifier.
    pub id: i64,
    /// First and last name.
    pub name: String,
}

impl From<&Monitor> for MonitorSummary {
    fn from(monitor: &Monitor) -> Self {
        Self {
            id: monitor.id,
            name: monitor.full_name(),
        }
    }
}

/// Client fields shown on verbose private-course items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    /// The client identifier.
    pub id: i64,
    /// First and last name.
    pub name: String,
    /// Date of birth, if recorded.
    pub birth_date: Option<Date>,
    /// The client's degree in the course's sport.
    pub degree_id: Option<i64>,
}

/// Kind-specific payload of a calendar item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarDetail {
    /// A private course slot.
    PrivateCourse {
        /// The course booked.
        course: CourseSummary,
        /// The booking holding the slot.
        booking_id: i64,
        /// The booking user representing the slot.
        booking_user_id: i64,
        /// The private group, if any.
        group_id: Option<i64>,
        /// Participants sharing the slot; only when verbose.
        participants: Option<u32>,
        /// The representing client; only when verbose.
        client: Option<ClientSummary>,
        /// The teaching monitor, if known.
        monitor: Option<MonitorSummary>,
    },
    /// A collective subgroup session.
    CollectiveCourse {
        /// The course taught.
        course: CourseSummary,
        /// The course date of the session.
        course_date_id: i64,
        /// The subgroup taught.
        subgroup_id: i64,
        /// The subgroup's level.
        degree_id: Option<i64>,
        /// Subgroup capacity.
        max_participants: u32,
        /// Booked participants; only when verbose.
        participants: Option<u32>,
        /// The assigned monitor, if known.
        monitor: Option<MonitorSummary>,
    },
    /// One day of a non-working-day block.
    NonWorkingDay {
        /// The block identifier.
        nwd_id: i64,
        /// Whether the block spans the whole day.
        full_day: bool,
        /// The block subtype.
        subtype: u8,
        /// Free-text reason.
        description: Option<String>,
        /// The blocked monitor, if known.
        monitor: Option<MonitorSummary>,
    },
    /// A monitor task.
    Task {
        /// The task identifier.
        task_id: i64,
        /// The task name.
        name: String,
        /// The assigned monitor, if known.
        monitor: Option<MonitorSummary>,
    },
}

/// One entry on the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    /// The kind of item.
    #[serde(rename = "type")]
    pub item_type: CalendarItemType,
    /// The local date.
    pub date: Date,
    /// Local wall-clock start.
    pub start_time: ClockTime,
    /// Local wall-clock end.
    pub end_time: ClockTime,
    /// Length in whole minutes.
    pub duration_minutes: u32,
    /// Start instant, RFC 3339 UTC.
    pub from: String,
    /// End instant, RFC 3339 UTC.
    pub to: String,
    /// The monitor the item belongs to, if any.
    pub monitor_id: Option<i64>,
    /// Kind-specific payload.
    pub detail: CalendarDetail,
}

/// Projects one source row onto a calendar item.
///
/// # Arguments
///
/// * `repo` - The scheduling repository, used for verbose participant counts
/// * `ctx` - The school context
/// * `source` - The row to project
/// * `verbose` - Include participant counts and client details
/// * `monitor_ctx` - The monitor the item belongs to, if known
/// * `client_ctx` - The client of a private slot, if known
///
/// # Errors
///
/// Returns an error if the item's hours are inverted, its course type is
/// unknown, its times cannot be resolved in the school's timezone, or the
/// repository fails.
pub fn to_calendar_item<R: SchedulingRepository + ?Sized>(
    repo: &R,
    ctx: &CalendarContext,
    source: CalendarSource<'_>,
    verbose: bool,
    monitor_ctx: Option<&Monitor>,
    client_ctx: Option<&Client>,
) -> Result<CalendarItem, CoreError> {
    let monitor: Option<MonitorSummary> = monitor_ctx.map(MonitorSummary::from);

    let (item_type, date, hours, monitor_id, detail) = match source {
        CalendarSource::PrivateSlot {
            course,
            booking_user,
        } => {
            let participants: Option<u32> = if verbose {
                let siblings: Vec<BookingUser> =
                    repo.booking_users_on(booking_user.school_id, booking_user.date)?;
                Some(private_group_size(booking_user, &siblings))
            } else {
                None
            };
            let client: Option<ClientSummary> =
                client_ctx.filter(|_| verbose).map(|client| ClientSummary {
                    id: client.id,
                    name: client.full_name(),
                    birth_date: client.birth_date,
                    degree_id: client.degree_for(course.sport_id),
                });
            (
                CalendarItemType::PrivateCourse,
                booking_user.date,
                booking_user.hours()?,
                booking_user.monitor_id,
                CalendarDetail::PrivateCourse {
                    course: CourseSummary::from_course(course)?,
                    booking_id: booking_user.booking_id,
                    booking_user_id: booking_user.id,
                    group_id: booking_user.group_id,
                    participants,
                    client,
                    monitor,
                },
            )
        }
        CalendarSource::CollectiveGroup {
            course,
            course_date,
            subgroup,
        } => {
            let participants: Option<u32> = if verbose {
                Some(count_subgroup_bookings(repo, subgroup.id, course.id)?)
            } else {
                None
            };
            (
                CalendarItemType::CollectiveCourse,
                course_date.date,
                course_date.hours()?,
                subgroup.monitor_id,
                CalendarDetail::CollectiveCourse {
                    course: CourseSummary::from_course(course)?,
                    course_date_id: course_date.id,
                    subgroup_id: subgroup.id,
                    degree_id: subgroup.degree_id,
                    max_participants: subgroup.max_participants,
                    participants,
                    monitor,
                },
            )
        }
        CalendarSource::NonWorkingDay { nwd, date } => (
            CalendarItemType::NonWorkingDay,
            date,
            nwd.blocked_hours(ctx.opening_hours),
            Some(nwd.monitor_id),
            CalendarDetail::NonWorkingDay {
                nwd_id: nwd.id,
                full_day: nwd.full_day,
                subtype: nwd.subtype,
                description: nwd.description.clone(),
                monitor,
            },
        ),
        CalendarSource::Task(task) => (
            CalendarItemType::Task,
            task.date,
            TimeRange::new(task.hour_start, task.hour_end)?,
            task.monitor_id,
            CalendarDetail::Task {
                task_id: task.id,
                name: task.name.clone(),
                monitor,
            },
        ),
    };

    Ok(CalendarItem {
        item_type,
        date,
        start_time: hours.start(),
        end_time: hours.end(),
        duration_minutes: hours.duration_minutes(),
        from: ctx.to_utc_rfc3339(date, hours.start())?,
        to: ctx.to_utc_rfc3339(date, hours.end())?,
        monitor_id,
        detail,
    })
}

/// Builds a school's planner over a date range.
///
/// Private slots appear once per slot, however many participants share it.
/// Non-working-day blocks appear once per covered day. Items are sorted by
/// date, start time, kind and monitor. Rows with inverted hours, or times
/// that do not exist in the school's timezone, are logged and left out.
///
/// # Arguments
///
/// * `repo` - The scheduling repository
/// * `config` - Engine configuration
/// * `school_id` - The school
/// * `range` - The dates to cover
/// * `monitor_ids` - Only include items for these monitors
/// * `verbose` - Include participant counts and client details
///
/// # Errors
///
/// Returns an error if the school does not exist, its timezone is invalid,
/// a course type is unknown, or the repository fails.
pub fn build_planner<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    school_id: i64,
    range: DateRange,
    monitor_ids: Option<&[i64]>,
    verbose: bool,
) -> Result<Vec<CalendarItem>, CoreError> {
    let school: School = repo
        .school(school_id)?
        .ok_or(CoreError::SchoolNotFound(school_id))?;
    let ctx: CalendarContext = CalendarContext::new(&school, config.default_opening_hours)?;

    let monitors: HashMap<i64, Monitor> = repo
        .monitors_for_school(school_id)?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let wanted = |monitor_id: Option<i64>| {
        monitor_ids.is_none_or(|ids| monitor_id.is_some_and(|id| ids.contains(&id)))
    };
    let monitor_for = |monitor_id: Option<i64>| monitor_id.and_then(|id| monitors.get(&id));

    let mut courses: HashMap<i64, Option<Course>> = HashMap::new();
    let mut items: Vec<CalendarItem> = Vec::new();

    let mut booking_users: Vec<BookingUser> = repo
        .booking_users_between(school_id, range)?
        .into_iter()
        .filter(|bu| bu.is_counted() && wanted(bu.monitor_id))
        .collect();
    booking_users.sort_by_key(|bu| bu.id);

    let mut seen_slots: HashSet<SlotKey> = HashSet::new();
    for booking_user in &booking_users {
        let Some(course) = cached_course(repo, &mut courses, booking_user.course_id)? else {
            warn!(
                booking_user_id = booking_user.id,
                course_id = booking_user.course_id,
                "Booking user references an unknown course"
            );
            continue;
        };
        if !course.kind()?.is_private() {
            continue;
        }
        let slot_key: SlotKey = (
            booking_user.course_id,
            booking_user.date,
            booking_user.hour_start,
            booking_user.hour_end,
            booking_user.monitor_id,
            booking_user.group_id,
            booking_user.booking_id,
        );
        if !seen_slots.insert(slot_key) {
            continue;
        }
        let client: Option<Client> = if verbose {
            repo.client(booking_user.client_id)?
        } else {
            None
        };
        let item: Result<CalendarItem, CoreError> = to_calendar_item(
            repo,
            &ctx,
            CalendarSource::PrivateSlot {
                course: &course,
                booking_user,
            },
            verbose,
            monitor_for(booking_user.monitor_id),
            client.as_ref(),
        );
        keep_projected(&mut items, item, "booking_user", booking_user.id)?;
    }

    let assignments: Vec<SubgroupAssignment> =
        repo.subgroup_assignments_between(school_id, range)?;
    for assignment in assignments.iter().filter(|a| wanted(a.monitor_id)) {
        let Some(course) = cached_course(repo, &mut courses, assignment.course_id)? else {
            continue;
        };
        let Some(course_date) = course.date(assignment.course_date_id) else {
            continue;
        };
        let Some(subgroup) = course_date
            .subgroups
            .iter()
            .find(|s| s.id == assignment.subgroup_id)
        else {
            continue;
        };
        let item: Result<CalendarItem, CoreError> = to_calendar_item(
            repo,
            &ctx,
            CalendarSource::CollectiveGroup {
                course: &course,
                course_date,
                subgroup,
            },
            verbose,
            monitor_for(assignment.monitor_id),
            None,
        );
        keep_projected(&mut items, item, "course_date", course_date.id)?;
    }

    for nwd in repo
        .monitor_nwds_between(school_id, range)?
        .iter()
        .filter(|n| wanted(Some(n.monitor_id)))
    {
        let Some(days) = DateRange::new(nwd.start_date, nwd.end_date)
            .ok()
            .and_then(|block| block.intersect(&range))
        else {
            warn!(nwd_id = nwd.id, "Non-working day block is outside the range or inverted");
            continue;
        };
        for date in days.days() {
            let day_ctx: CalendarContext =
                ctx.with_opening_hours(opening_hours_on(repo, config, school_id, date)?);
            let item: Result<CalendarItem, CoreError> = to_calendar_item(
                repo,
                &day_ctx,
                CalendarSource::NonWorkingDay { nwd, date },
                verbose,
                monitor_for(Some(nwd.monitor_id)),
                None,
            );
            keep_projected(&mut items, item, "monitor_nwd", nwd.id)?;
        }
    }

    for task in repo
        .tasks_between(school_id, range)?
        .iter()
        .filter(|t| wanted(t.monitor_id))
    {
        let item: Result<CalendarItem, CoreError> = to_calendar_item(
            repo,
            &ctx,
            CalendarSource::Task(task),
            verbose,
            monitor_for(task.monitor_id),
            None,
        );
        keep_projected(&mut items, item, "monitor_task", task.id)?;
    }

    items.sort_by_key(|item| (item.date, item.start_time, item.item_type, item.monitor_id));
    debug!(school_id, items = items.len(), "Built planner");
    Ok(items)
}

/// Pushes a projected row, skipping rows whose own times are unusable.
fn keep_projected(
    items: &mut Vec<CalendarItem>,
    projected: Result<CalendarItem, CoreError>,
    row: &'static str,
    row_id: i64,
) -> Result<(), CoreError> {
    match projected {
        Ok(item) => items.push(item),
        Err(
            err @ (CoreError::DomainViolation(
                DomainError::InvalidTimeRange { .. } | DomainError::InvalidClockTime(_),
            )
            | CoreError::UnresolvableLocalTime { .. }),
        ) => {
            warn!(row, row_id, error = %err, "Skipping planner row");
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

fn cached_course<R: SchedulingRepository + ?Sized>(
    repo: &R,
    cache: &mut HashMap<i64, Option<Course>>,
    course_id: i64,
) -> Result<Option<Course>, CoreError> {
    if let Some(course) = cache.get(&course_id) {
        return Ok(course.clone());
    }
    let course: Option<Course> = repo.course(course_id)?;
    cache.insert(course_id, course.clone());
    Ok(course)
}
