// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking price resolution.
//!
//! The base price of a booking user depends on the course kind:
//!
//! - Fixed courses (private or collective) charge the flat course price
//! - Flexible private courses look up the slot's duration interval in the
//!   course's price table and pick the price for the slot's group size
//! - Flexible collective courses charge the course price once per distinct
//!   date the client booked, discounted by the ordinal of that date
//!
//! Extras and cancellation insurance are added on top.
//!
//! ## Invariants
//!
//! - No component of a price is ever negative
//! - Missing catalog data (unknown interval, unpriced group size, unknown
//!   extra) contributes zero and is logged; it is never an error
//! - Ordinal discounts follow booking order (ascending booking-user id),
//!   not calendar order

use crate::error::DomainError;
use crate::interval::interval_label_for_seconds;
use crate::types::{Booking, BookingUser, Course, CourseKind, PriceTier};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;

/// Default cancellation insurance rate (10% of base plus extras).
pub const DEFAULT_CANCELLATION_INSURANCE_RATE: f64 = 0.10;

/// Pricing parameters that are school policy rather than course data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Fraction of base plus extras charged for cancellation insurance.
    pub cancellation_insurance_rate: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            cancellation_insurance_rate: DEFAULT_CANCELLATION_INSURANCE_RATE,
        }
    }
}

/// The resolved price of one booking user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceBreakdown {
    /// Course price before extras.
    pub base: f64,
    /// Sum of extras.
    pub extras: f64,
    /// Cancellation insurance surcharge.
    pub insurance: f64,
    /// `base + extras + insurance`.
    pub total: f64,
}

/// Computes the price of a booking user.
///
/// # Arguments
///
/// * `course` - The booked course
/// * `booking` - The parent booking
/// * `booking_user` - The booking user being priced
/// * `siblings` - Related booking users: the users sharing the private slot,
///   or the client's bookings for the collective course. May include
///   `booking_user` itself.
/// * `policy` - School pricing policy
///
/// # Returns
///
/// The price breakdown, rounded to cents.
///
/// # Errors
///
/// Returns an error if:
/// - The course type is unknown
/// - The booking user does not belong to `course` or `booking`
pub fn compute_price(
    course: &Course,
    booking: &Booking,
    booking_user: &BookingUser,
    siblings: &[BookingUser],
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, DomainError> {
    if booking_user.course_id != course.id {
        return Err(DomainError::CourseMismatch {
            booking_user_id: booking_user.id,
            expected_course_id: booking_user.course_id,
            actual_course_id: course.id,
        });
    }
    if booking_user.booking_id != booking.id {
        return Err(DomainError::BookingMismatch {
            booking_user_id: booking_user.id,
            expected_booking_id: booking_user.booking_id,
            actual_booking_id: booking.id,
        });
    }

    let base: f64 = match course.kind()? {
        CourseKind::FixedPrivate | CourseKind::FixedCollective => course.price,
        CourseKind::FlexiblePrivate => flexible_private_base(course, booking_user, siblings),
        CourseKind::FlexibleCollective => {
            flexible_collective_base(course, booking_user, siblings)
        }
    };
    let base: f64 = round_cents(base.max(0.0));
    let extras: f64 = round_cents(extras_total(course, booking_user));

    let insurance: f64 = if booking.has_cancellation_insurance {
        round_cents((policy.cancellation_insurance_rate * (base + extras)).max(0.0))
    } else {
        0.0
    };

    Ok(PriceBreakdown {
        base,
        extras,
        insurance,
        total: round_cents(base + extras + insurance),
    })
}

/// Returns the number of participants sharing `booking_user`'s private slot,
/// including `booking_user` itself.
///
/// Only counted (active, non-cancelled) siblings contribute.
#[must_use]
pub fn private_group_size(booking_user: &BookingUser, siblings: &[BookingUser]) -> u32 {
    let others: usize = siblings
        .iter()
        .filter(|s| s.id != booking_user.id && s.is_counted())
        .filter(|s| booking_user.shares_private_slot(s))
        .count();
    u32::try_from(others).map_or(u32::MAX, |n| n.saturating_add(1))
}

/// Returns the distinct dates the client booked on `booking_user`'s course,
/// in booking order.
///
/// Booking order is ascending booking-user id; a date's position is that of
/// its first booking. `booking_user` itself is always included, so that a
/// pending row can be quoted.
#[must_use]
pub fn client_booking_dates(booking_user: &BookingUser, siblings: &[BookingUser]) -> Vec<Date> {
    let mut rows: Vec<&BookingUser> = siblings
        .iter()
        .filter(|s| s.course_id == booking_user.course_id && s.client_id == booking_user.client_id)
        .filter(|s| s.id == booking_user.id || s.is_counted())
        .collect();
    if !rows.iter().any(|s| s.id == booking_user.id) {
        rows.push(booking_user);
    }
    rows.sort_by_key(|s| s.id);

    let mut dates: Vec<Date> = Vec::with_capacity(rows.len());
    for row in rows {
        if !dates.contains(&row.date) {
            dates.push(row.date);
        }
    }
    dates
}

/// Rounds an amount to cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn flexible_private_base(
    course: &Course,
    booking_user: &BookingUser,
    siblings: &[BookingUser],
) -> f64 {
    let Ok(hours) = booking_user.hours() else {
        warn!(
            booking_user_id = booking_user.id,
            "Booking user slot ends before it starts, no price"
        );
        return 0.0;
    };

    let Some(interval) = interval_label_for_seconds(hours.duration_seconds()) else {
        warn!(
            course_id = course.id,
            booking_user_id = booking_user.id,
            duration_seconds = hours.duration_seconds(),
            "Slot duration has no price interval, no price"
        );
        return 0.0;
    };

    let Some(tier) = course
        .price_range
        .iter()
        .find(|t: &&PriceTier| t.interval.trim() == interval)
    else {
        warn!(
            course_id = course.id,
            interval, "No price tier for interval, no price"
        );
        return 0.0;
    };

    let group_size: u32 = private_group_size(booking_user, siblings);
    tier.price_for(group_size).unwrap_or_else(|| {
        warn!(
            course_id = course.id,
            interval,
            group_size,
            "Price tier has no price for group size, no price"
        );
        0.0
    })
}

fn flexible_collective_base(
    course: &Course,
    booking_user: &BookingUser,
    siblings: &[BookingUser],
) -> f64 {
    client_booking_dates(booking_user, siblings)
        .iter()
        .zip(1_u32..)
        .map(|(_, ordinal)| {
            let discount: f64 = course
                .discounts
                .iter()
                .find(|d| d.day == ordinal)
                .map_or(0.0, |d| d.reduction.clamp(0.0, 100.0));
            (course.price * (1.0 - discount / 100.0)).max(0.0)
        })
        .sum()
}

fn extras_total(course: &Course, booking_user: &BookingUser) -> f64 {
    booking_user
        .extras
        .iter()
        .map(|line| match course.extra(line.course_extra_id) {
            Some(extra) => (extra.price * f64::from(line.quantity)).max(0.0),
            None => {
                warn!(
                    course_id = course.id,
                    course_extra_id = line.course_extra_id,
                    "Extra not in course catalog, not charged"
                );
                0.0
            }
        })
        .sum()
}
