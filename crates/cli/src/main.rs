// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line front end for the scheduling engine.
//!
//! Loads a JSON snapshot of a school's scheduling rows, runs one engine
//! operation against it and prints the result as pretty JSON on stdout.
//! Logs go to stderr.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, bail},
};
use serde::Serialize;
use skischool::{
    CalendarItem, CoreError, CourseAvailability, DateRange, EngineConfig, MonitorQuery,
    MonitorsBySport, SchedulingRepository, Snapshot, build_planner, compute_availability,
    find_available_monitors, group_monitors_by_sport, is_monitor_busy, price_booking_user,
};
use skischool_domain::{ClockTime, Course, Monitor, PriceBreakdown, TimeRange};
use std::path::PathBuf;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string())),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    args.run()
}

#[derive(Debug, Parser)]
#[command(name = "skischool", author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON snapshot of scheduling data
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Path to a JSON engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD); defaults to the current UTC date
    #[arg(long, value_parser = parse_date)]
    today: Option<Date>,

    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }

    fn run(self) -> Result<()> {
        let snapshot: Snapshot = Snapshot::from_path(&self.snapshot)
            .wrap_err_with(|| format!("loading snapshot {}", self.snapshot.display()))?;
        let config: EngineConfig = match &self.config {
            Some(path) => EngineConfig::from_path(path)
                .wrap_err_with(|| format!("loading config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        let today: Date = self
            .today
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());
        debug!(%today, ?config, "Starting");

        self.command.run(&snapshot, &config, today)
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Compute a course's availability
    #[command(visible_alias = "a")]
    Availability {
        /// The course
        #[arg(long)]
        course: i64,

        /// First day of the range; defaults to the active season
        #[arg(long, value_parser = parse_date, requires = "to")]
        from: Option<Date>,

        /// Last day of the range
        #[arg(long, value_parser = parse_date, requires = "from")]
        to: Option<Date>,

        /// Only count Saturday and Sunday dates
        #[arg(long)]
        weekends_only: bool,
    },

    /// List monitors free to teach a window
    #[command(visible_alias = "m")]
    Monitors {
        #[arg(long)]
        school: i64,

        #[arg(long)]
        sport: i64,

        /// Lowest acceptable degree
        #[arg(long)]
        min_degree: Option<i64>,

        #[arg(long, value_parser = parse_date)]
        date: Date,

        #[arg(long)]
        start: ClockTime,

        #[arg(long)]
        end: ClockTime,

        /// At least one participant is an adult
        #[arg(long)]
        adults: bool,

        /// Participant language; repeat for several
        #[arg(long = "language")]
        languages: Vec<i64>,

        /// Booking user whose own claims are ignored; repeat for several
        #[arg(long = "ignore")]
        ignore: Vec<i64>,
    },

    /// Check whether one monitor is busy during a window
    #[command(visible_alias = "b")]
    Busy {
        #[arg(long)]
        monitor: i64,

        #[arg(long)]
        school: i64,

        #[arg(long, value_parser = parse_date)]
        date: Date,

        #[arg(long)]
        start: ClockTime,

        #[arg(long)]
        end: ClockTime,

        /// Booking user whose own claims are ignored; repeat for several
        #[arg(long = "ignore")]
        ignore: Vec<i64>,
    },

    /// Price a booking user
    #[command(visible_alias = "p")]
    Price {
        #[arg(long)]
        booking_user: i64,
    },

    /// Build a school's planner
    #[command(visible_alias = "pl")]
    Planner {
        #[arg(long)]
        school: i64,

        #[arg(long, value_parser = parse_date)]
        from: Date,

        #[arg(long, value_parser = parse_date)]
        to: Date,

        /// Only include this monitor; repeat for several
        #[arg(long = "monitor")]
        monitors: Vec<i64>,

        /// Include participant counts and client details
        #[arg(long)]
        detailed: bool,
    },
}

impl Command {
    fn run(self, snapshot: &Snapshot, config: &EngineConfig, today: Date) -> Result<()> {
        match self {
            Self::Availability {
                course,
                from,
                to,
                weekends_only,
            } => {
                let range: Option<DateRange> = match (from, to) {
                    (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
                    _ => None,
                };
                let availability: CourseAvailability =
                    availability(snapshot, config, course, range, weekends_only, today)?;
                print_json(&availability)
            }
            Self::Monitors {
                school,
                sport,
                min_degree,
                date,
                start,
                end,
                adults,
                languages,
                ignore,
            } => {
                let query: MonitorQuery = MonitorQuery {
                    school_id: school,
                    sport_id: sport,
                    minimum_degree_id: min_degree,
                    date,
                    window: window(start, end)?,
                    adults_present: adults,
                    client_languages: languages,
                    ignore_booking_users: ignore,
                };
                let monitors: Vec<Monitor> = find_available_monitors(snapshot, config, &query)?;
                info!(count = monitors.len(), "Available monitors");
                print_json(&monitors)
            }
            Self::Busy {
                monitor,
                school,
                date,
                start,
                end,
                ignore,
            } => {
                let busy: bool = is_monitor_busy(
                    snapshot,
                    config,
                    monitor,
                    school,
                    date,
                    window(start, end)?,
                    &ignore,
                )?;
                print_json(&serde_json::json!({ "monitor_id": monitor, "busy": busy }))
            }
            Self::Price { booking_user } => {
                let price: PriceBreakdown =
                    price_booking_user(snapshot, config, booking_user, None)?;
                print_json(&price)
            }
            Self::Planner {
                school,
                from,
                to,
                monitors,
                detailed,
            } => {
                let filter: Option<&[i64]> = (!monitors.is_empty()).then_some(monitors.as_slice());
                let items: Vec<CalendarItem> = build_planner(
                    snapshot,
                    config,
                    school,
                    DateRange::new(from, to)?,
                    filter,
                    detailed,
                )?;
                info!(count = items.len(), "Planner items");
                print_json(&items)
            }
        }
    }
}

fn availability(
    snapshot: &Snapshot,
    config: &EngineConfig,
    course_id: i64,
    range: Option<DateRange>,
    weekends_only: bool,
    today: Date,
) -> Result<CourseAvailability> {
    let course: Course = snapshot
        .course(course_id)?
        .ok_or(CoreError::CourseNotFound(course_id))?;
    let monitors: Vec<Monitor> = snapshot.monitors_for_school(course.school_id)?;
    let by_sport: MonitorsBySport = group_monitors_by_sport(&monitors);
    Ok(compute_availability(
        snapshot,
        config,
        &course,
        &by_sport,
        range,
        weekends_only,
        today,
    )?)
}

fn window(start: ClockTime, end: ClockTime) -> Result<TimeRange> {
    if end <= start {
        bail!("window end {end} must be after its start {start}");
    }
    Ok(TimeRange::new(start, end)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json: String = serde_json::to_string_pretty(value).wrap_err("serializing result")?;
    println!("{json}");
    Ok(())
}

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, DATE_FORMAT).map_err(|err| format!("invalid date {value:?}: {err}"))
}
