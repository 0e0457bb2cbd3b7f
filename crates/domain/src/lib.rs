// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod interval;
mod pricing;
mod types;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use interval::{
    ClockTime, TimeRange, interval_label_for_minutes, interval_label_for_seconds,
    minutes_for_interval_label, parse_duration_seconds, parse_interval_seconds, seconds_between,
    seconds_to_hours, time_difference_seconds,
};
pub use pricing::{
    DEFAULT_CANCELLATION_INSURANCE_RATE, PriceBreakdown, PricingPolicy, client_booking_dates,
    compute_price, private_group_size, round_cents,
};
pub use types::{
    Booking, BookingStatus, BookingUser, BookingUserExtra, COURSE_TYPE_COLLECTIVE,
    COURSE_TYPE_PRIVATE, Client, ClientSportDegree, Course, CourseDate, CourseExtra, CourseKind,
    CourseSubgroup, Degree, Discount, MONITOR_LANGUAGE_SLOTS, Monitor, MonitorNwd,
    MonitorSportAuthorization, MonitorTask, PriceTier, School, Season,
};
