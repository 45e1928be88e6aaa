//! Listening hours per hour of the day, in the configured time zone.

use std::path::{Path, PathBuf};

use chrono::Timelike;
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, PLAY_DATE};
use super::helpers::{Chart, Entry, PLAY_COUNT, TOTAL_TIME};

pub const UNIT: &str = "playtime_by_hour";

/// Option selecting `12` or `24` hour labels. Defaults to 24.
pub const HOUR_FORMAT: &str = "hour_format";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_DATE, PLAY_COUNT, TOTAL_TIME])?;

    let tz = clock::time_zone(params, UNIT);
    let twelve_hour = params
        .get_for(UNIT, HOUR_FORMAT)
        .is_some_and(|v| v.to_string() == "12");

    let hours: [f64; 24] = clock::hour_buckets(dataset.rows_with(&[PLAY_DATE]).filter_map(|row| {
        let local = clock::date(row, PLAY_DATE)?.with_timezone(&tz);
        Some((local.hour() as usize, clock::play_hours(row)))
    }));

    let entries = hours
        .iter()
        .enumerate()
        .map(|(hour, value)| Entry {
            label: hour_label(hour, twelve_hour),
            value: *value,
        })
        .collect();

    let chart = Chart::new("Total Play Time by Hour of Day", "Hour of Day", "Play Time (hours)", entries);
    chart.write(UNIT, params, output_prefix)
}

fn hour_label(hour: usize, twelve_hour: bool) -> String {
    if !twelve_hour {
        return hour.to_string();
    }
    let suffix = if hour < 12 { "am" } else { "pm" };
    match hour % 12 {
        0 => format!("12{}", suffix),
        h => format!("{}{}", h, suffix),
    }
}
