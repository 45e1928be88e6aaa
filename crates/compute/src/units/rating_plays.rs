//! Play count per star rating (0-5).

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, Chart, Entry, PLAY_COUNT, RATING};

pub const UNIT: &str = "rating_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_COUNT])?;

    // Unrated tracks have no Rating field at all and count as zero stars.
    let mut by_stars = [0i64; 6];
    for row in dataset.rows() {
        let stars = helpers::rating_to_stars(helpers::int_or_zero(row, RATING));
        let total = &mut by_stars[stars as usize];
        *total = total.saturating_add(helpers::play_count(row));
    }

    let entries = by_stars
        .iter()
        .enumerate()
        .map(|(stars, plays)| Entry {
            label: format!("{} stars", stars),
            value: *plays,
        })
        .collect();

    let chart = Chart::new("Play Count by Rating", "Rating", "Total Play Count", entries);
    chart.write(UNIT, params, output_prefix)
}
