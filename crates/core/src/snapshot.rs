// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory scheduling data loaded from a JSON export.
//!
//! A `Snapshot` is the repository used by the CLI and by the test suite.
//! It holds one school's (or several schools') rows exactly as exported and
//! answers every `SchedulingRepository` lookup by filtering in memory.

use crate::error::RepositoryError;
use crate::repository::{DateRange, SchedulingRepository, SubgroupAssignment};
use serde::{Deserialize, Serialize};
use skischool_domain::{
    Booking, BookingStatus, BookingUser, Client, Course, Degree, Monitor, MonitorNwd, MonitorTask,
    School, Season, TimeRange,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Date;
use tracing::{debug, warn};

/// Snapshot loading errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for this schema.
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A complete set of scheduling rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub schools: Vec<School>,
    pub seasons: Vec<Season>,
    pub courses: Vec<Course>,
    pub bookings: Vec<Booking>,
    pub booking_users: Vec<BookingUser>,
    pub monitors: Vec<Monitor>,
    pub degrees: Vec<Degree>,
    pub monitor_nwds: Vec<MonitorNwd>,
    pub monitor_tasks: Vec<MonitorTask>,
    pub clients: Vec<Client>,
}

impl Snapshot {
    /// Parses a JSON snapshot and joins booking statuses onto booking users.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: Self = serde_json::from_str(json)?;
        snapshot.join_booking_status();
        debug!(
            schools = snapshot.schools.len(),
            courses = snapshot.courses.len(),
            booking_users = snapshot.booking_users.len(),
            monitors = snapshot.monitors.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Reads a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let contents: String = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Copies each parent booking's status onto its booking users.
    ///
    /// Booking users whose booking is missing are marked cancelled so they
    /// never hold capacity or monitor time.
    pub fn join_booking_status(&mut self) {
        let statuses: HashMap<i64, BookingStatus> =
            self.bookings.iter().map(|b| (b.id, b.status)).collect();

        for booking_user in &mut self.booking_users {
            if let Some(status) = statuses.get(&booking_user.booking_id) {
                booking_user.booking_status = *status;
            } else {
                warn!(
                    booking_user_id = booking_user.id,
                    booking_id = booking_user.booking_id,
                    "Booking user references an unknown booking, treating as cancelled"
                );
                booking_user.booking_status = BookingStatus::Cancelled;
            }
        }
    }

    fn school_courses(&self, school_id: i64) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(move |c| c.school_id == school_id)
    }
}

impl SchedulingRepository for Snapshot {
    fn school(&self, school_id: i64) -> Result<Option<School>, RepositoryError> {
        Ok(self.schools.iter().find(|s| s.id == school_id).cloned())
    }

    fn active_season(&self, school_id: i64, on: Date) -> Result<Option<Season>, RepositoryError> {
        Ok(self
            .seasons
            .iter()
            .find(|s| s.school_id == school_id && s.covers(on))
            .cloned())
    }

    fn course(&self, course_id: i64) -> Result<Option<Course>, RepositoryError> {
        Ok(self.courses.iter().find(|c| c.id == course_id).cloned())
    }

    fn booking(&self, booking_id: i64) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.bookings.iter().find(|b| b.id == booking_id).cloned())
    }

    fn booking_user(&self, booking_user_id: i64) -> Result<Option<BookingUser>, RepositoryError> {
        Ok(self
            .booking_users
            .iter()
            .find(|bu| bu.id == booking_user_id)
            .cloned())
    }

    fn booking_users_for_course(
        &self,
        course_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<BookingUser>, RepositoryError> {
        Ok(self
            .booking_users
            .iter()
            .filter(|bu| bu.course_id == course_id)
            .filter(|bu| range.is_none_or(|r| r.contains(bu.date)))
            .cloned()
            .collect())
    }

    fn booking_users_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<BookingUser>, RepositoryError> {
        Ok(self
            .booking_users
            .iter()
            .filter(|bu| bu.school_id == school_id && range.contains(bu.date))
            .cloned()
            .collect())
    }

    fn booking_users_for_client_course(
        &self,
        client_id: i64,
        course_id: i64,
    ) -> Result<Vec<BookingUser>, RepositoryError> {
        Ok(self
            .booking_users
            .iter()
            .filter(|bu| bu.client_id == client_id && bu.course_id == course_id)
            .cloned()
            .collect())
    }

    fn booking_users_in_subgroup(
        &self,
        subgroup_id: i64,
    ) -> Result<Vec<BookingUser>, RepositoryError> {
        Ok(self
            .booking_users
            .iter()
            .filter(|bu| bu.course_subgroup_id == Some(subgroup_id))
            .cloned()
            .collect())
    }

    fn monitor_nwds_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<MonitorNwd>, RepositoryError> {
        Ok(self
            .monitor_nwds
            .iter()
            .filter(|n| {
                n.school_id == school_id
                    && n.start_date <= range.end()
                    && range.start() <= n.end_date
            })
            .cloned()
            .collect())
    }

    fn subgroup_assignments_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<SubgroupAssignment>, RepositoryError> {
        let mut assignments: Vec<SubgroupAssignment> = Vec::new();

        for course in self.school_courses(school_id) {
            for course_date in course.dates.iter().filter(|d| range.contains(d.date)) {
                let hours: TimeRange = match course_date.hours() {
                    Ok(hours) => hours,
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
                assignments.extend(course_date.subgroups.iter().map(|subgroup| {
                    SubgroupAssignment {
                        course_id: course.id,
                        course_date_id: course_date.id,
                        subgroup_id: subgroup.id,
                        monitor_id: subgroup.monitor_id,
                        date: course_date.date,
                        hours,
                    }
                }));
            }
        }

        Ok(assignments)
    }

    fn find_subgroup_id_for_monitor_and_course(
        &self,
        monitor_id: i64,
        course_id: i64,
        date: Date,
    ) -> Result<Option<i64>, RepositoryError> {
        Ok(self
            .courses
            .iter()
            .filter(|c| c.id == course_id)
            .flat_map(|c| c.dates.iter())
            .filter(|d| d.date == date)
            .flat_map(|d| d.subgroups.iter())
            .find(|s| s.monitor_id == Some(monitor_id))
            .map(|s| s.id))
    }

    fn monitors_for_school(&self, school_id: i64) -> Result<Vec<Monitor>, RepositoryError> {
        Ok(self
            .monitors
            .iter()
            .filter(|m| m.school_id == school_id)
            .cloned()
            .collect())
    }

    fn degree(&self, degree_id: i64) -> Result<Option<Degree>, RepositoryError> {
        Ok(self.degrees.iter().find(|d| d.id == degree_id).cloned())
    }

    fn tasks_between(
        &self,
        school_id: i64,
        range: DateRange,
    ) -> Result<Vec<MonitorTask>, RepositoryError> {
        Ok(self
            .monitor_tasks
            .iter()
            .filter(|t| t.school_id == school_id && range.contains(t.date))
            .cloned()
            .collect())
    }

    fn client(&self, client_id: i64) -> Result<Option<Client>, RepositoryError> {
        Ok(self.clients.iter().find(|c| c.id == client_id).cloned())
    }
}
