//! Total play count per album, top N. Albums are keyed by artist so that
//! two "Greatest Hits" never merge.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ALBUM, ARTIST, Chart, PLAY_COUNT};

pub const UNIT: &str = "album_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[ARTIST, ALBUM, PLAY_COUNT])?;

    let top = params.top_for(UNIT);
    let totals = helpers::sum_by(dataset.rows(), |row| {
        let artist = helpers::text(row, ARTIST)?;
        let album = helpers::text(row, ALBUM)?;
        Some((helpers::album_label(artist, album), helpers::play_count(row)))
    });

    let chart = Chart::new(
        format!("Top {} Albums by Play Count", top),
        "Total Play Count",
        ALBUM,
        helpers::top_n(totals, top),
    );
    chart.write(UNIT, params, output_prefix)
}
