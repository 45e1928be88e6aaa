//! Total skip count per album, top N.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ALBUM, ALBUM_ARTIST, Chart, SKIP_COUNT};

pub const UNIT: &str = "album_skips";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[ALBUM, ALBUM_ARTIST, SKIP_COUNT])?;

    let top = params.top_for(UNIT);
    let totals = helpers::sum_by(dataset.rows_with(&[ALBUM, ALBUM_ARTIST, SKIP_COUNT]), |row| {
        let artist = helpers::text(row, ALBUM_ARTIST)?;
        let album = helpers::text(row, ALBUM)?;
        Some((helpers::album_label(artist, album), helpers::skip_count(row)))
    });

    let chart = Chart::new(
        format!("Top {} Albums by Skip Count", top),
        "Total Skip Count",
        ALBUM,
        helpers::top_n(totals, top),
    );
    chart.write(UNIT, params, output_prefix)
}
