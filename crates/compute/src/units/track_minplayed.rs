//! Share of all tracks played at least N times, for N up to the 99th
//! percentile of played tracks.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, Chart, PLAY_COUNT};

pub const UNIT: &str = "track_minplayed";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_COUNT])?;

    let mut played: Vec<i64> = dataset
        .rows()
        .map(helpers::play_count)
        .filter(|p| *p > 0)
        .collect();
    if played.is_empty() {
        anyhow::bail!("No tracks with play counts > 0 found");
    }

    // Unplayed tracks still count towards the whole.
    let chart = Chart::new(
        "Percentage of Tracks Played At Least N Times",
        "Minimum Play Count (N)",
        "Percentage of tracks",
        helpers::min_played_curve(&mut played, dataset.len()),
    );
    chart.write(UNIT, params, output_prefix)
}
