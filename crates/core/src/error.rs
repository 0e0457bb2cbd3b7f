// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use skischool_domain::DomainError;
use time::Date;

/// Errors raised by a scheduling repository implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    Unavailable(String),
    /// A query failed to execute.
    QueryFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Repository unavailable: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Errors that terminate an engine computation.
///
/// Data gaps never surface here; they degrade to zeroed results and a log
/// line. These variants cover invalid inputs and repository failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The repository failed.
    Repository(RepositoryError),
    /// The requested course does not exist.
    CourseNotFound(i64),
    /// The requested booking does not exist.
    BookingNotFound(i64),
    /// The requested booking user does not exist.
    BookingUserNotFound(i64),
    /// The requested school does not exist.
    SchoolNotFound(i64),
    /// The requested minimum degree does not exist.
    DegreeNotFound(i64),
    /// A date range ends before it starts.
    InvalidDateRange {
        /// The start of the range.
        start: Date,
        /// The end of the range.
        end: Date,
    },
    /// The school's timezone is not a valid IANA identifier.
    InvalidTimezone(String),
    /// A wall-clock time does not map to a single instant in the school's timezone.
    UnresolvableLocalTime {
        /// The calendar date.
        date: Date,
        /// The wall-clock time.
        time: String,
        /// The timezone.
        timezone: String,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Repository(err) => write!(f, "{err}"),
            Self::CourseNotFound(id) => write!(f, "Course {id} not found"),
            Self::BookingNotFound(id) => write!(f, "Booking {id} not found"),
            Self::BookingUserNotFound(id) => write!(f, "Booking user {id} not found"),
            Self::SchoolNotFound(id) => write!(f, "School {id} not found"),
            Self::DegreeNotFound(id) => write!(f, "Degree {id} not found"),
            Self::InvalidDateRange { start, end } => {
                write!(f, "Invalid date range: {end} is before {start}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::UnresolvableLocalTime {
                date,
                time,
                timezone,
            } => {
                write!(
                    f,
                    "Could not resolve {date} {time} in {timezone} (ambiguous or non-existent due to DST)"
                )
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}
