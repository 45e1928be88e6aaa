//! Artists with the highest skips-to-plays ratio, top N. Artists without
//! plays are left out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ARTIST, Chart, PLAY_COUNT, SKIP_COUNT};

pub const UNIT: &str = "artist_skip_ratio";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[ARTIST, PLAY_COUNT, SKIP_COUNT])?;

    let top = params.top_for(UNIT);
    let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();
    for row in dataset.rows_with(&[ARTIST, PLAY_COUNT, SKIP_COUNT]) {
        let plays = helpers::play_count(row);
        let Some(artist) = helpers::text(row, ARTIST).filter(|_| plays > 0) else {
            continue;
        };
        let (p, s) = totals.entry(artist).or_default();
        *p = p.saturating_add(plays);
        *s = s.saturating_add(helpers::skip_count(row));
    }

    let ratios = totals
        .into_iter()
        .map(|(artist, (plays, skips))| (helpers::trim_label(artist, 32), skips as f64 / plays as f64))
        .collect();

    let chart = Chart::new(
        format!("Top {} Artists by Skip-to-Play Ratio", top),
        "Skip-to-Play Ratio",
        ARTIST,
        helpers::top_n_f64(ratios, top),
    );
    chart.write(UNIT, params, output_prefix)
}
