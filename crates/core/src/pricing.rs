// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::repository::SchedulingRepository;
use skischool_domain::{Booking, BookingUser, Course, CourseKind, PriceBreakdown, compute_price};
use tracing::debug;

/// Prices a booking user.
///
/// # Arguments
///
/// * `repo` - The scheduling repository
/// * `config` - Engine configuration
/// * `booking_user_id` - The booking user to price
/// * `grouped` - Related booking users already loaded by the caller. When
///   `None`, they are fetched: users on the same date for flexible private
///   courses, the client's rows for flexible collective courses.
///
/// # Errors
///
/// Returns an error if the booking user, its course or its booking does not
/// exist, the rows are inconsistent, or the repository fails.
pub fn price_booking_user<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    booking_user_id: i64,
    grouped: Option<&[BookingUser]>,
) -> Result<PriceBreakdown, CoreError> {
    let booking_user: BookingUser = repo
        .booking_user(booking_user_id)?
        .ok_or(CoreError::BookingUserNotFound(booking_user_id))?;
    let course: Course = repo
        .course(booking_user.course_id)?
        .ok_or(CoreError::CourseNotFound(booking_user.course_id))?;
    let booking: Booking = repo
        .booking(booking_user.booking_id)?
        .ok_or(CoreError::BookingNotFound(booking_user.booking_id))?;

    let fetched: Vec<BookingUser>;
    let siblings: &[BookingUser] = if let Some(grouped) = grouped {
        grouped
    } else {
        fetched = match course.kind()? {
            CourseKind::FlexiblePrivate => {
                repo.booking_users_on(booking_user.school_id, booking_user.date)?
            }
            CourseKind::FlexibleCollective => {
                repo.booking_users_for_client_course(booking_user.client_id, course.id)?
            }
            CourseKind::FixedCollective | CourseKind::FixedPrivate => Vec::new(),
        };
        &fetched
    };

    let price: PriceBreakdown = compute_price(
        &course,
        &booking,
        &booking_user,
        siblings,
        &config.pricing_policy(),
    )?;
    debug!(
        booking_user_id,
        course_id = course.id,
        total = price.total,
        "Priced booking user"
    );
    Ok(price)
}
