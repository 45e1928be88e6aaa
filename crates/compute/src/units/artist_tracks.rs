//! Number of tracks per artist, top N.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ARTIST, Chart};

pub const UNIT: &str = "artist_tracks";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[ARTIST])?;

    let top = params.top_for(UNIT);
    let totals = helpers::sum_by(dataset.rows(), |row| {
        helpers::text(row, ARTIST).map(|artist| (artist.to_string(), 1))
    });

    let chart = Chart::new(
        format!("Top {} Artists by Number of Tracks", top),
        "Number of Tracks",
        ARTIST,
        helpers::top_n(totals, top),
    );
    chart.write(UNIT, params, output_prefix)
}
