// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur while interpreting scheduling read models.
///
/// Data gaps (unparseable durations, unmatched price tiers, missing extras)
/// are not errors: they degrade to zero and are logged. These variants are
/// reserved for inputs the engine cannot reason about at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The course type code is not one of the known course types.
    InvalidCourseType {
        /// The course identifier.
        course_id: i64,
        /// The unrecognised course type code.
        course_type: u8,
    },
    /// A time-of-day string could not be parsed.
    InvalidClockTime(String),
    /// A time range ends before it starts.
    InvalidTimeRange {
        /// The start of the range.
        start: String,
        /// The end of the range.
        end: String,
    },
    /// A booking or booking-user status code is not recognised.
    InvalidStatus(u8),
    /// The booking user does not belong to the supplied course.
    CourseMismatch {
        /// The booking user identifier.
        booking_user_id: i64,
        /// The course the booking user references.
        expected_course_id: i64,
        /// The course that was supplied.
        actual_course_id: i64,
    },
    /// The booking user does not belong to the supplied booking.
    BookingMismatch {
        /// The booking user identifier.
        booking_user_id: i64,
        /// The booking the booking user references.
        expected_booking_id: i64,
        /// The booking that was supplied.
        actual_booking_id: i64,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCourseType {
                course_id,
                course_type,
            } => {
                write!(
                    f,
                    "Course {course_id} has unknown course type {course_type}"
                )
            }
            Self::InvalidClockTime(value) => write!(f, "Invalid time of day: '{value}'"),
            Self::InvalidTimeRange { start, end } => {
                write!(f, "Invalid time range: {end} is before {start}")
            }
            Self::InvalidStatus(code) => write!(f, "Invalid status code: {code}"),
            Self::CourseMismatch {
                booking_user_id,
                expected_course_id,
                actual_course_id,
            } => {
                write!(
                    f,
                    "Booking user {booking_user_id} belongs to course {expected_course_id}, not {actual_course_id}"
                )
            }
            Self::BookingMismatch {
                booking_user_id,
                expected_booking_id,
                actual_booking_id,
            } => {
                write!(
                    f,
                    "Booking user {booking_user_id} belongs to booking {expected_booking_id}, not {actual_booking_id}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
