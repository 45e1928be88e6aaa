//! Tracks per quarter of their last play.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, PLAY_DATE};
use super::helpers::Chart;

pub const UNIT: &str = "historical_last_played";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_DATE])?;

    let entries = clock::per_quarter(dataset.rows().filter_map(|row| clock::date(row, PLAY_DATE)));

    let chart = Chart::new(
        "Tracks Last Played Per Quarter Over Time",
        "Quarter",
        "Number of Tracks Last Played",
        entries,
    );
    chart.write(UNIT, params, output_prefix)
}
