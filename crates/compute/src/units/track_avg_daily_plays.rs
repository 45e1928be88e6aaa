//! Tracks with the most plays per day since they were added, top N.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, DATE_ADDED};
use super::helpers::{self, ARTIST, Chart, NAME, PLAY_COUNT};

pub const UNIT: &str = "track_avg_daily_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_COUNT, DATE_ADDED, NAME, ARTIST])?;

    let top = params.top_for(UNIT);
    let today = Utc::now();
    let averages = dataset
        .rows_with(&[PLAY_COUNT, DATE_ADDED, NAME, ARTIST])
        .filter_map(|row| {
            let added = clock::date(row, DATE_ADDED)?;
            let label = helpers::track_label(helpers::text(row, ARTIST)?, helpers::text(row, NAME)?);
            let days = clock::days_between(added, today);
            Some((label, helpers::play_count(row) as f64 / days as f64))
        })
        .collect();

    let chart = Chart::new(
        format!("Top {} Tracks by Average Daily Plays", top),
        "Average Daily Plays",
        "Track",
        helpers::top_n_f64(averages, top),
    );
    chart.write(UNIT, params, output_prefix)
}
