//! Total play count per genre, top N.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, Chart, GENRE, PLAY_COUNT};

pub const UNIT: &str = "genre_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[GENRE, PLAY_COUNT])?;

    let top = params.top_for(UNIT);
    let totals = helpers::sum_by(dataset.rows(), |row| {
        helpers::text(row, GENRE).map(|genre| (genre.to_string(), helpers::play_count(row)))
    });

    let chart = Chart::new(
        format!("Top {} Genres by Play Count", top),
        "Total Play Count",
        GENRE,
        helpers::top_n(totals, top),
    );
    chart.write(UNIT, params, output_prefix)
}
