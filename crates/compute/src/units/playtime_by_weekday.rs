//! Listening hours per weekday, in the configured time zone.

use std::path::{Path, PathBuf};

use chrono::Datelike;
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, PLAY_DATE};
use super::helpers::{Chart, Entry, PLAY_COUNT, TOTAL_TIME};

pub const UNIT: &str = "playtime_by_weekday";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_DATE, PLAY_COUNT, TOTAL_TIME])?;

    let tz = clock::time_zone(params, UNIT);
    let hours: [f64; 7] = clock::hour_buckets(
        dataset
            .rows_with(&[PLAY_DATE, PLAY_COUNT, TOTAL_TIME])
            .filter_map(|row| {
                let local = clock::date(row, PLAY_DATE)?.with_timezone(&tz);
                Some((local.weekday().num_days_from_monday() as usize, clock::play_hours(row)))
            }),
    );

    let entries = WEEKDAYS
        .iter()
        .zip(hours)
        .map(|(day, value)| Entry {
            label: day.to_string(),
            value,
        })
        .collect();

    let chart = Chart::new("Total Play Time by Weekday", "Weekday", "Play Time (hours)", entries);
    chart.write(UNIT, params, output_prefix)
}
