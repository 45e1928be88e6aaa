//! Total play count per artist, top N.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ARTIST, Chart, PLAY_COUNT};

pub const UNIT: &str = "artist_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[ARTIST, PLAY_COUNT])?;

    let top = params.top_for(UNIT);
    let totals = helpers::sum_by(dataset.rows(), |row| {
        helpers::text(row, ARTIST).map(|artist| (artist.to_string(), helpers::play_count(row)))
    });

    let chart = Chart::new(
        format!("Top {} Artists by Play Count", top),
        "Total Play Count",
        ARTIST,
        helpers::top_n(totals, top),
    );
    chart.write(UNIT, params, output_prefix)
}
