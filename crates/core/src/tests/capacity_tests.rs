// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    SKI, SNOWBOARD, create_test_booking, create_test_booking_user, create_test_course,
    create_test_course_date, create_test_monitor, create_test_nwd, create_test_snapshot,
    create_test_subgroup,
};
use crate::{
    CoreError, CourseAvailability, DateRange, EngineConfig, MonitorsBySport, Snapshot,
    compute_availability, count_subgroup_bookings, group_monitors_by_sport,
};
use skischool_domain::{BookingStatus, Course, CourseDate, DomainError, PriceTier};
use std::collections::BTreeMap;
use time::Date;
use time::macros::date;

const TODAY: Date = date!(2024 - 01 - 10);

fn availability(snapshot: &Snapshot, course: &Course) -> CourseAvailability {
    let monitors: MonitorsBySport = group_monitors_by_sport(&snapshot.monitors);
    compute_availability(
        snapshot,
        &EngineConfig::default(),
        course,
        &monitors,
        None,
        false,
        TODAY,
    )
    .unwrap()
}

fn collective_date(id: i64, course_id: i64, date: Date, subgroups: &[(i64, u32)]) -> CourseDate {
    let mut course_date: CourseDate =
        create_test_course_date(id, course_id, date, "10:00", "12:00");
    course_date.subgroups = subgroups
        .iter()
        .map(|(subgroup_id, max)| create_test_subgroup(*subgroup_id, course_id, id, *max, None))
        .collect();
    course_date
}

/// Private course 1 ("1h", max 1) on 2024-01-08 09:00-11:00 with two ski monitors.
fn private_snapshot() -> (Snapshot, Course) {
    let mut course: Course = create_test_course(1, 2, false);
    course.dates = vec![create_test_course_date(
        11,
        1,
        date!(2024 - 01 - 08),
        "09:00",
        "11:00",
    )];

    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.monitors = vec![create_test_monitor(1, SKI, 2), create_test_monitor(2, SKI, 2)];
    snapshot.courses = vec![course.clone()];
    snapshot.bookings = vec![create_test_booking(1, BookingStatus::Active)];
    (snapshot, course)
}

#[test]
fn test_fixed_collective_books_against_first_date_capacity() {
    let mut course: Course = create_test_course(1, 1, false);
    course.dates = vec![
        collective_date(11, 1, date!(2024 - 01 - 06), &[(101, 2), (102, 2)]),
        collective_date(12, 1, date!(2024 - 01 - 13), &[(103, 2), (104, 2)]),
    ];

    let mut first = create_test_booking_user(1, 1, 1, 11, date!(2024 - 01 - 06), "10:00", "12:00");
    first.course_subgroup_id = Some(101);
    let mut second = create_test_booking_user(2, 1, 1, 12, date!(2024 - 01 - 13), "10:00", "12:00");
    second.course_subgroup_id = Some(104);
    let mut third = create_test_booking_user(3, 1, 1, 12, date!(2024 - 01 - 13), "10:00", "12:00");
    third.course_subgroup_id = Some(104);

    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.courses = vec![course.clone()];
    snapshot.bookings = vec![create_test_booking(1, BookingStatus::Active)];
    snapshot.booking_users = vec![first, second, third];
    snapshot.join_booking_status();

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.total_places - 4.0).abs() < f64::EPSILON);
    assert!((result.total_hours - 8.0).abs() < f64::EPSILON);
    assert!((result.booked_places - 1.5).abs() < f64::EPSILON);
    assert!(
        (result.available_places - (result.total_places - result.booked_places)).abs()
            < f64::EPSILON
    );
}

#[test]
fn test_fixed_collective_without_subgroups_is_zero() {
    let mut course: Course = create_test_course(1, 1, false);
    course.dates = vec![collective_date(11, 1, date!(2024 - 01 - 06), &[])];

    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.courses = vec![course.clone()];

    assert_eq!(availability(&snapshot, &course), CourseAvailability::default());
}

#[test]
fn test_no_dates_in_range_is_zero() {
    let mut course: Course = create_test_course(1, 1, true);
    course.dates = vec![collective_date(11, 1, date!(2024 - 01 - 06), &[(101, 4)])];
    let snapshot: Snapshot = create_test_snapshot();

    let february: DateRange = DateRange::new(date!(2024 - 02 - 01), date!(2024 - 02 - 29)).unwrap();
    let result: CourseAvailability = compute_availability(
        &snapshot,
        &EngineConfig::default(),
        &course,
        &MonitorsBySport::new(),
        Some(february),
        false,
        TODAY,
    )
    .unwrap();

    assert_eq!(result, CourseAvailability::default());
}

#[test]
fn test_cancelled_booking_never_consumes_places() {
    let mut course: Course = create_test_course(1, 1, false);
    course.dates = vec![collective_date(11, 1, date!(2024 - 01 - 06), &[(101, 4)])];

    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.courses = vec![course.clone()];
    snapshot.bookings = vec![create_test_booking(1, BookingStatus::Cancelled)];
    snapshot.booking_users = vec![create_test_booking_user(
        1,
        1,
        1,
        11,
        date!(2024 - 01 - 06),
        "10:00",
        "12:00",
    )];
    snapshot.join_booking_status();

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!(result.booked_places.abs() < f64::EPSILON);
    assert!((result.available_places - 4.0).abs() < f64::EPSILON);
}

#[test]
fn test_flexible_collective_counts_each_subgroup() {
    let mut course: Course = create_test_course(1, 1, true);
    course.dates = vec![
        collective_date(11, 1, date!(2024 - 01 - 06), &[(101, 4)]),
        collective_date(12, 1, date!(2024 - 01 - 07), &[(102, 4)]),
    ];

    let mut booking_users = Vec::new();
    for (id, course_date_id, subgroup_id, day) in [
        (1, 11, 101, date!(2024 - 01 - 06)),
        (2, 11, 101, date!(2024 - 01 - 06)),
        (3, 12, 102, date!(2024 - 01 - 07)),
        (4, 12, 102, date!(2024 - 01 - 07)),
    ] {
        let mut booking_user =
            create_test_booking_user(id, 1, 1, course_date_id, day, "10:00", "12:00");
        booking_user.course_subgroup_id = Some(subgroup_id);
        booking_users.push(booking_user);
    }
    booking_users[3].status = BookingStatus::Cancelled;

    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.courses = vec![course.clone()];
    snapshot.bookings = vec![create_test_booking(1, BookingStatus::Active)];
    snapshot.booking_users = booking_users;
    snapshot.join_booking_status();

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.total_places - 8.0).abs() < f64::EPSILON);
    assert!((result.booked_places - 3.0).abs() < f64::EPSILON);
    assert!((result.total_hours - 16.0).abs() < f64::EPSILON);
    assert!((result.booked_hours - 6.0).abs() < f64::EPSILON);
    assert!((result.available_places - 5.0).abs() < f64::EPSILON);
    assert_eq!(count_subgroup_bookings(&snapshot, 101, 1).unwrap(), 2);
    assert_eq!(count_subgroup_bookings(&snapshot, 102, 1).unwrap(), 1);
}

#[test]
fn test_weekends_only_filters_dates() {
    let mut course: Course = create_test_course(1, 1, true);
    course.dates = vec![
        collective_date(11, 1, date!(2024 - 01 - 05), &[(101, 4)]),
        collective_date(12, 1, date!(2024 - 01 - 06), &[(102, 4)]),
    ];
    let snapshot: Snapshot = create_test_snapshot();

    let result: CourseAvailability = compute_availability(
        &snapshot,
        &EngineConfig::default(),
        &course,
        &MonitorsBySport::new(),
        None,
        true,
        TODAY,
    )
    .unwrap();

    assert!((result.total_places - 4.0).abs() < f64::EPSILON);
}

#[test]
fn test_range_defaults_to_active_season() {
    let mut course: Course = create_test_course(1, 1, true);
    course.dates = vec![
        collective_date(11, 1, date!(2024 - 01 - 08), &[(101, 3)]),
        collective_date(12, 1, date!(2024 - 06 - 03), &[(102, 3)]),
    ];
    let snapshot: Snapshot = create_test_snapshot();
    let config: EngineConfig = EngineConfig::default();
    let monitors: MonitorsBySport = MonitorsBySport::new();

    let in_season: CourseAvailability =
        compute_availability(&snapshot, &config, &course, &monitors, None, false, TODAY).unwrap();
    let off_season: CourseAvailability = compute_availability(
        &snapshot,
        &config,
        &course,
        &monitors,
        None,
        false,
        date!(2024 - 08 - 01),
    )
    .unwrap();

    assert!((in_season.total_places - 3.0).abs() < f64::EPSILON);
    assert!((off_season.total_places - 6.0).abs() < f64::EPSILON);
}

#[test]
fn test_private_other_course_steals_monitor_time() {
    let (mut snapshot, course) = private_snapshot();
    let mut other = create_test_booking_user(1, 1, 2, 21, date!(2024 - 01 - 08), "09:00", "10:00");
    other.monitor_id = Some(1);
    snapshot.booking_users = vec![other];
    snapshot.join_booking_status();

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.total_places - 4.0).abs() < f64::EPSILON);
    assert!((result.total_hours - 4.0).abs() < f64::EPSILON);
    assert!(result.booked_places.abs() < f64::EPSILON);
    assert!((result.available_places - 3.0).abs() < f64::EPSILON);
    assert!((result.available_hours - 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_private_same_monitor_slot_is_stolen_once() {
    let (mut snapshot, course) = private_snapshot();
    let mut first = create_test_booking_user(1, 1, 2, 21, date!(2024 - 01 - 08), "09:00", "10:00");
    first.monitor_id = Some(1);
    let mut second = first.clone();
    second.id = 2;
    second.client_id = 501;
    snapshot.booking_users = vec![first, second];
    snapshot.join_booking_status();

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.available_places - 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_private_own_booking_consumes_places() {
    let (mut snapshot, course) = private_snapshot();
    let mut own = create_test_booking_user(1, 1, 1, 11, date!(2024 - 01 - 08), "09:00", "10:00");
    own.monitor_id = Some(2);
    snapshot.booking_users = vec![own];
    snapshot.join_booking_status();

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.booked_places - 1.0).abs() < f64::EPSILON);
    assert!((result.booked_hours - 1.0).abs() < f64::EPSILON);
    assert!((result.available_places - 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_private_blocking_nwd_reduces_availability() {
    let (mut snapshot, course) = private_snapshot();
    snapshot.monitor_nwds = vec![
        create_test_nwd(1, 1, date!(2024 - 01 - 08), None, 2),
        create_test_nwd(2, 2, date!(2024 - 01 - 08), None, 1),
    ];

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.total_places - 4.0).abs() < f64::EPSILON);
    assert!((result.available_places - 2.0).abs() < f64::EPSILON);
    assert!((result.available_hours - 2.0).abs() < f64::EPSILON);
}

#[test]
fn test_private_without_sport_monitors_is_zero() {
    let (mut snapshot, course) = private_snapshot();
    snapshot.monitors = vec![create_test_monitor(1, SNOWBOARD, 2)];

    assert_eq!(availability(&snapshot, &course), CourseAvailability::default());
}

#[test]
fn test_private_unparseable_duration_is_zero() {
    let (snapshot, mut course) = private_snapshot();
    course.duration = String::from("soon");

    assert_eq!(availability(&snapshot, &course), CourseAvailability::default());
}

#[test]
fn test_flexible_private_uses_first_priced_interval() {
    let (snapshot, mut course) = private_snapshot();
    course.is_flexible = true;
    course.duration = String::new();
    course.price_range = vec![
        PriceTier {
            interval: String::from("30m"),
            prices: BTreeMap::new(),
        },
        PriceTier {
            interval: String::from("1h"),
            prices: BTreeMap::from([(1, Some(50.0))]),
        },
        PriceTier {
            interval: String::from("2h"),
            prices: BTreeMap::from([(1, Some(90.0))]),
        },
    ];

    let result: CourseAvailability = availability(&snapshot, &course);

    assert!((result.total_places - 4.0).abs() < f64::EPSILON);
}

#[test]
fn test_unknown_course_type_is_rejected() {
    let (snapshot, mut course) = private_snapshot();
    course.course_type = 9;

    let result = compute_availability(
        &snapshot,
        &EngineConfig::default(),
        &course,
        &MonitorsBySport::new(),
        None,
        false,
        TODAY,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidCourseType {
            course_id: 1,
            course_type: 9
        }))
    ));
}
