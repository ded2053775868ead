use chrono::{Duration, NaiveDateTime};

use crate::domain::time::{format_iso_z, round_to_second};
use crate::domain::{Configuration, ObservedWindow, RunParams};
use crate::error::Result;

/// Degraded-axis order used when none is requested
pub const DEFAULT_DEGRADED_AXES: [i64; 3] = [1, 2, 3];

/// Days of slack allowed around the observed departure days
pub const WINDOW_SLACK_DAYS: i64 = 3;

/// Pull a requested start forward to `(observed_min - 3d)` at 23:59:59 when
/// it falls on an earlier day, then round to the nearest second.
pub fn clamp_start(start: NaiveDateTime, observed_min: NaiveDateTime) -> NaiveDateTime {
    let floor = (observed_min - Duration::days(WINDOW_SLACK_DAYS)).date();
    let clamped = if start.date() < floor {
        floor.and_hms_opt(23, 59, 59).unwrap_or(start)
    } else {
        start
    };
    round_to_second(clamped)
}

/// Pull a requested end back to `(observed_max + 3d)` at midnight when it
/// falls on a later day.
pub fn clamp_end(end: NaiveDateTime, observed_max: NaiveDateTime) -> NaiveDateTime {
    let ceiling = (observed_max + Duration::days(WINDOW_SLACK_DAYS)).date();
    if end.date() > ceiling {
        ceiling.and_hms_opt(0, 0, 0).unwrap_or(end)
    } else {
        end
    }
}

/// Configuration block of one mapped record
pub fn build_configuration(
    template: &Configuration,
    params: &RunParams,
    window: &ObservedWindow,
) -> Result<Configuration> {
    let mut configuration = template.clone();

    if let Some(enabled) = params.efficiency_enabled {
        configuration.efficiency_enabled = enabled.to_string();
    }
    configuration.degraded_axes = params
        .degraded_axes
        .clone()
        .unwrap_or_else(|| DEFAULT_DEGRADED_AXES.to_vec());
    if let Some(decrease) = params.soc_decrease {
        configuration.soc_decrease = decrease;
    }
    if let Some(step) = params.time_step {
        configuration.time_step = step;
    }
    configuration.max_exec_time = params.max_exec_time;

    let (start, end) = params.optim_bounds()?;
    if let Some(start) = start {
        configuration.optim_start = format_iso_z(clamp_start(start, window.min));
    }
    if let Some(end) = end {
        configuration.optim_end = format_iso_z(clamp_end(end, window.max));
    }

    Ok(configuration)
}
