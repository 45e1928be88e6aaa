//! Played tracks per ISO week number, in the configured time zone. Weeks
//! without plays are left out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, PLAY_DATE};
use super::helpers::{Chart, Entry};

pub const UNIT: &str = "plays_by_isoweek";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_DATE])?;

    let tz = clock::time_zone(params, UNIT);
    let mut weeks: BTreeMap<u32, i64> = BTreeMap::new();
    for row in dataset.rows_with(&[PLAY_DATE]) {
        if let Some(played) = clock::date(row, PLAY_DATE) {
            *weeks.entry(played.with_timezone(&tz).iso_week().week()).or_default() += 1;
        }
    }

    let entries = weeks
        .into_iter()
        .map(|(week, value)| Entry {
            label: format!("W{:02}", week),
            value,
        })
        .collect();

    let chart = Chart::new("Plays by Week Number", "Week Number", "Tracks", entries);
    chart.write(UNIT, params, output_prefix)
}
