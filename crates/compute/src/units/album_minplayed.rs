//! Share of played albums whose least played track reached N plays, for N
//! up to the 99th percentile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ALBUM, ALBUM_ARTIST, Chart, PLAY_COUNT};

pub const UNIT: &str = "album_minplayed";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[ALBUM, ALBUM_ARTIST, PLAY_COUNT])?;

    let mut least: HashMap<(&str, &str), i64> = HashMap::new();
    for row in dataset.rows_with(&[ALBUM, ALBUM_ARTIST, PLAY_COUNT]) {
        if let (Some(artist), Some(album)) = (helpers::text(row, ALBUM_ARTIST), helpers::text(row, ALBUM)) {
            let plays = helpers::play_count(row);
            least
                .entry((artist, album))
                .and_modify(|m| *m = (*m).min(plays))
                .or_insert(plays);
        }
    }

    let mut played: Vec<i64> = least.into_values().filter(|p| *p > 0).collect();
    if played.is_empty() {
        anyhow::bail!("No albums with play counts > 0 found");
    }
    let out_of = played.len();

    let chart = Chart::new(
        "Percentage of Albums Played At Least N Times",
        "Minimum Play Count (N)",
        "Percentage of albums",
        helpers::min_played_curve(&mut played, out_of),
    );
    chart.write(UNIT, params, output_prefix)
}
