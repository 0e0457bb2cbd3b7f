// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Snapshot;
use skischool_domain::{
    Booking, BookingStatus, BookingUser, ClockTime, Course, CourseDate, CourseSubgroup, Degree,
    MONITOR_LANGUAGE_SLOTS, Monitor, MonitorNwd, MonitorSportAuthorization, School, Season,
    TimeRange,
};
use time::Date;
use time::macros::date;

pub const SCHOOL_ID: i64 = 1;
pub const SKI: i64 = 10;
pub const SNOWBOARD: i64 = 20;
pub const CLIENT_ID: i64 = 500;

pub fn clock(value: &str) -> ClockTime {
    ClockTime::parse(value).unwrap()
}

pub fn hours(start: &str, end: &str) -> TimeRange {
    TimeRange::parse(start, end).unwrap()
}

pub fn create_test_school() -> School {
    School {
        id: SCHOOL_ID,
        name: String::from("Escuela Test"),
        timezone: String::from("Europe/Madrid"),
    }
}

/// Season running 2023-12-01 to 2024-04-30, open 09:00-17:00.
pub fn create_test_season() -> Season {
    Season {
        id: 1,
        school_id: SCHOOL_ID,
        start_date: date!(2023 - 12 - 01),
        end_date: date!(2024 - 04 - 30),
        hour_start: clock("09:00"),
        hour_end: clock("17:00"),
    }
}

pub fn create_test_monitor(id: i64, sport_id: i64, degree_order: u32) -> Monitor {
    let mut languages: [Option<i64>; MONITOR_LANGUAGE_SLOTS] = [None; MONITOR_LANGUAGE_SLOTS];
    languages[0] = Some(1);
    Monitor {
        id,
        school_id: SCHOOL_ID,
        first_name: format!("Monitor{id}"),
        last_name: String::from("Test"),
        active_school: true,
        languages,
        sports: vec![MonitorSportAuthorization {
            sport_id,
            degree_id: 100 + i64::from(degree_order),
            degree_order,
            allow_adults: true,
        }],
    }
}

pub fn create_test_degree(id: i64, sport_id: i64, degree_order: u32) -> Degree {
    Degree {
        id,
        sport_id,
        name: format!("Level {degree_order}"),
        degree_order,
    }
}

pub fn create_test_course(id: i64, course_type: u8, is_flexible: bool) -> Course {
    Course {
        id,
        school_id: SCHOOL_ID,
        sport_id: SKI,
        station_id: Some(3),
        name: format!("Course {id}"),
        course_type,
        is_flexible,
        duration: String::from("1h"),
        max_participants: 1,
        price: 50.0,
        price_range: Vec::new(),
        discounts: Vec::new(),
        extras: Vec::new(),
        dates: Vec::new(),
    }
}

pub fn create_test_course_date(
    id: i64,
    course_id: i64,
    date: Date,
    start: &str,
    end: &str,
) -> CourseDate {
    CourseDate {
        id,
        course_id,
        date,
        hour_start: clock(start),
        hour_end: clock(end),
        subgroups: Vec::new(),
    }
}

pub fn create_test_subgroup(
    id: i64,
    course_id: i64,
    course_date_id: i64,
    max_participants: u32,
    monitor_id: Option<i64>,
) -> CourseSubgroup {
    CourseSubgroup {
        id,
        course_id,
        course_date_id,
        degree_id: None,
        monitor_id,
        max_participants,
    }
}

pub fn create_test_booking(id: i64, status: BookingStatus) -> Booking {
    Booking {
        id,
        school_id: SCHOOL_ID,
        status,
        has_cancellation_insurance: false,
    }
}

/// An active booking user with no monitor, subgroup or group.
pub fn create_test_booking_user(
    id: i64,
    booking_id: i64,
    course_id: i64,
    course_date_id: i64,
    date: Date,
    start: &str,
    end: &str,
) -> BookingUser {
    BookingUser {
        id,
        booking_id,
        school_id: SCHOOL_ID,
        course_id,
        course_date_id,
        course_subgroup_id: None,
        monitor_id: None,
        client_id: CLIENT_ID,
        group_id: None,
        date,
        hour_start: clock(start),
        hour_end: clock(end),
        status: BookingStatus::Active,
        booking_status: BookingStatus::Pending,
        extras: Vec::new(),
    }
}

pub fn create_test_nwd(
    id: i64,
    monitor_id: i64,
    date: Date,
    times: Option<(&str, &str)>,
    subtype: u8,
) -> MonitorNwd {
    MonitorNwd {
        id,
        monitor_id,
        school_id: SCHOOL_ID,
        start_date: date,
        end_date: date,
        start_time: times.map(|(start, _)| clock(start)),
        end_time: times.map(|(_, end)| clock(end)),
        full_day: times.is_none(),
        subtype,
        description: None,
    }
}

/// A snapshot holding the test school and season.
pub fn create_test_snapshot() -> Snapshot {
    Snapshot {
        schools: vec![create_test_school()],
        seasons: vec![create_test_season()],
        ..Snapshot::default()
    }
}
