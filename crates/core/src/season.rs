// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::repository::{DateRange, SchedulingRepository};
use skischool_domain::{Season, TimeRange};
use time::Date;
use tracing::{debug, warn};

/// Returns the date range of the school's season active on `today`.
///
/// # Arguments
///
/// * `repo` - The scheduling repository
/// * `school_id` - The school
/// * `today` - The reference date
///
/// # Returns
///
/// * `Ok(None)` if no season covers `today`
///
/// # Errors
///
/// Returns an error if the repository fails or the stored season is inverted.
pub fn season_range<R: SchedulingRepository + ?Sized>(
    repo: &R,
    school_id: i64,
    today: Date,
) -> Result<Option<DateRange>, CoreError> {
    let Some(season) = repo.active_season(school_id, today)? else {
        debug!(school_id, %today, "No active season");
        return Ok(None);
    };
    DateRange::new(season.start_date, season.end_date).map(Some)
}

/// Returns the school's opening hours on `date`.
///
/// Falls back to the configured default when no season covers the date or
/// the season's hours are inverted.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub fn opening_hours_on<R: SchedulingRepository + ?Sized>(
    repo: &R,
    config: &EngineConfig,
    school_id: i64,
    date: Date,
) -> Result<TimeRange, CoreError> {
    let season: Option<Season> = repo.active_season(school_id, date)?;
    let Some(season) = season else {
        return Ok(config.default_opening_hours);
    };

    Ok(season.opening_hours().unwrap_or_else(|err| {
        warn!(
            school_id,
            season_id = season.id,
            error = %err,
            "Invalid season hours, using default"
        );
        config.default_opening_hours
    }))
}
