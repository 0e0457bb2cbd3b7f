// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The read-only data seam between the engine and the store that owns
//! scheduling rows.
//!
//! Every lookup is typed and parameterized; implementations must never build
//! queries from interpolated strings. The engine treats results as an
//! immutable snapshot for the duration of one computation.

use crate::error::{CoreError, RepositoryError};
use serde::{Deserialize, Serialize};
use skischool_domain::{
    Booking, BookingUser, Client, Course, Degree, Monitor, MonitorNwd, MonitorTask, School, Season,
    TimeRange,
};
use time::{Date, Duration};

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a new `DateRange`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDateRange` if `end` is before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering a single day.
    #[must_use]
    pub const fn single(date: Date) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns whether `date` falls within the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the overlap of two ranges, if any.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start: Date = self.start.max(other.start);
        let end: Date = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Iterates the days of the range in order.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end: Date = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.checked_add(Duration::DAY).filter(|next| *next <= end)
        })
    }
}

/// A collective-course subgroup placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgroupAssignment {
    /// The course.
    pub course_id: i64,
    /// The course date.
    pub course_date_id: i64,
    /// The subgroup.
    pub subgroup_id: i64,
    /// The assigned monitor, if any.
    pub monitor_id: Option<i64>,
    /// Calendar date of the session.
    pub date: Date,
    /// Session hours.
    pub hours: TimeRange,
}

/// Read access to scheduling rows.
///
/// All school-scoped lookups return rows for that school only. Booking-user
/// lookups return rows of every status, with the parent booking's status
/// joined into `BookingUser::booking_status`; callers filter with
/// `BookingUser::is_counted`.
pub trait SchedulingRepository {
    /// Looks up a school.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn school(&self, school_id: i64) -> Result<Option<School>, RepositoryError>;

    /// Returns the school's season covering `on`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn active_season(&self, school_id: i64, on: Date) -> Result<Option<Season>, RepositoryError>;

    /// Looks up a course with its dates and subgroups.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn course(&self, course_id: i64) -> Result<Option<Course>, RepositoryError>;

    /// Looks up a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking(&self, booking_id: i64) -> Result<Option<Booking>, RepositoryError>;

    /// Looks up a booking user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking_user(&self, booking_user_id: i64) -> Result<Option<BookingUser>, RepositoryError>;

    /// Returns the booking users of a course, optionally limited to a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking_users_for_course(
        &self,
        course_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<BookingUser>, RepositoryError>;

    /// Returns every booking user of a school within a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking_users_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<BookingUser>, RepositoryError>;

    /// Returns every booking user of a school on one date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking_users_on(
        &self,
        school_id: i64,
        date: Date,
    ) -> Result<Vec<BookingUser>, RepositoryError> {
        self.booking_users_between(school_id, DateRange::single(date))
    }

    /// Returns a client's booking users for one course.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking_users_for_client_course(
        &self,
        client_id: i64,
        course_id: i64,
    ) -> Result<Vec<BookingUser>, RepositoryError>;

    /// Returns the booking users placed in a subgroup.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn booking_users_in_subgroup(
        &self,
        subgroup_id: i64,
    ) -> Result<Vec<BookingUser>, RepositoryError>;

    /// Returns the school's non-working-day blocks intersecting a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn monitor_nwds_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<MonitorNwd>, RepositoryError>;

    /// Returns the school's non-working-day blocks covering one date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn monitor_nwds_on(
        &self,
        school_id: i64,
        date: Date,
    ) -> Result<Vec<MonitorNwd>, RepositoryError> {
        self.monitor_nwds_between(school_id, DateRange::single(date))
    }

    /// Returns the collective subgroups scheduled within a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn subgroup_assignments_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<SubgroupAssignment>, RepositoryError>;

    /// Returns the collective subgroups scheduled on one date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn subgroup_assignments_on(
        &self,
        school_id: i64,
        date: Date,
    ) -> Result<Vec<SubgroupAssignment>, RepositoryError> {
        self.subgroup_assignments_between(school_id, DateRange::single(date))
    }

    /// Returns the subgroup a monitor teaches for a course on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn find_subgroup_id_for_monitor_and_course(
        &self,
        monitor_id: i64,
        course_id: i64,
        date: Date,
    ) -> Result<Option<i64>, RepositoryError>;

    /// Returns the monitors working for a school.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn monitors_for_school(&self, school_id: i64) -> Result<Vec<Monitor>, RepositoryError>;

    /// Looks up a degree.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn degree(&self, degree_id: i64) -> Result<Option<Degree>, RepositoryError>;

    /// Returns the school's monitor tasks within a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn tasks_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<MonitorTask>, RepositoryError>;

    /// Looks up a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn client(&self, client_id: i64) -> Result<Option<Client>, RepositoryError>;
}
