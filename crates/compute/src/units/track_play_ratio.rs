//! Tracks with the highest plays-to-skips ratio, top N. A track that was
//! never skipped scores its play count plus one.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ARTIST, Chart, NAME, PLAY_COUNT, SKIP_COUNT};

pub const UNIT: &str = "track_play_ratio";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[NAME, ARTIST, PLAY_COUNT, SKIP_COUNT])?;

    let top = params.top_for(UNIT);
    let ratios = dataset
        .rows_with(&[NAME, ARTIST, PLAY_COUNT, SKIP_COUNT])
        .filter_map(|row| {
            let plays = helpers::play_count(row);
            if plays == 0 {
                return None;
            }
            let label = helpers::track_label(helpers::text(row, ARTIST)?, helpers::text(row, NAME)?);
            Some((label, play_ratio(plays, helpers::skip_count(row))))
        })
        .collect();

    let chart = Chart::new(
        format!("Top {} Tracks by Play-to-Skip Ratio", top),
        "Play-to-Skip Ratio",
        "Track",
        helpers::top_n_f64(ratios, top),
    );
    chart.write(UNIT, params, output_prefix)
}

fn play_ratio(plays: i64, skips: i64) -> f64 {
    if skips == 0 {
        plays as f64 + 1.0
    } else {
        plays as f64 / skips as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_skipped_scores_plays_plus_one() {
        assert_eq!(play_ratio(4, 0), 5.0);
        assert_eq!(play_ratio(9, 3), 3.0);
    }
}
