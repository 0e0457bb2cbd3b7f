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

//! Course availability and monitor scheduling engine.
//!
//! Every computation is a synchronous read over a [`SchedulingRepository`].
//! The reference date is always passed in explicitly.

mod calendar;
mod capacity;
mod config;
mod error;
mod monitor_conflicts;
mod pricing;
mod repository;
mod season;
mod snapshot;

#[cfg(test)]
mod tests;

pub use calendar::{
    CalendarContext, CalendarDetail, CalendarItem, CalendarItemType, CalendarSource,
    ClientSummary, CourseSummary, MonitorSummary, build_planner, to_calendar_item,
};
pub use capacity::{
    CourseAvailability, MonitorsBySport, compute_availability, count_subgroup_bookings,
    group_monitors_by_sport,
};
pub use config::{ConfigError, EngineConfig, NWD_SUBTYPE_BLOCK};
pub use error::{CoreError, RepositoryError};
pub use monitor_conflicts::{
    MonitorClaim, MonitorQuery, collect_monitor_claims, find_available_monitors, is_monitor_busy,
};
pub use pricing::price_booking_user;
pub use repository::{DateRange, SchedulingRepository, SubgroupAssignment};
pub use season::{opening_hours_on, season_range};
pub use snapshot::{Snapshot, SnapshotError};
