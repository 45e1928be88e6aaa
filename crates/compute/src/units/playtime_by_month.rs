//! Listening hours per calendar month, in the configured time zone.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Month};
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, PLAY_DATE};
use super::helpers::{Chart, Entry, PLAY_COUNT, TOTAL_TIME};

pub const UNIT: &str = "playtime_by_month";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_DATE, PLAY_COUNT, TOTAL_TIME])?;

    let tz = clock::time_zone(params, UNIT);
    let hours: [f64; 12] = clock::hour_buckets(dataset.rows_with(&[PLAY_DATE]).filter_map(|row| {
        let local = clock::date(row, PLAY_DATE)?.with_timezone(&tz);
        Some((local.month0() as usize, clock::play_hours(row)))
    }));

    let entries = hours
        .iter()
        .enumerate()
        .map(|(month0, value)| Entry {
            label: month_name(month0),
            value: *value,
        })
        .collect();

    let chart = Chart::new("Total Play Time by Month", "Month", "Play Time (hours)", entries);
    chart.write(UNIT, params, output_prefix)
}

fn month_name(month0: usize) -> String {
    Month::try_from(month0 as u8 + 1)
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names() {
        assert_eq!(month_name(0), "January");
        assert_eq!(month_name(11), "December");
    }
}
