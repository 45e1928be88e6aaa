//! Play count per release decade, oldest first. Not limited by top N.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, Chart, Entry, PLAY_COUNT, YEAR};

pub const UNIT: &str = "decade_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[YEAR, PLAY_COUNT])?;

    let totals = helpers::sum_by(dataset.rows(), |row| {
        let year = helpers::int_or_zero(row, YEAR);
        (year > 0).then(|| (decade_label(year), helpers::play_count(row)))
    });

    let mut entries: Vec<Entry> = totals
        .into_iter()
        .map(|(label, value)| Entry { label, value })
        .collect();
    entries.sort_by(|a, b| a.label.cmp(&b.label));

    let chart = Chart::new("Play Count by Decade", "Decade", "Total Play Count", entries);
    chart.write(UNIT, params, output_prefix)
}

fn decade_label(year: i64) -> String {
    format!("{}s", year - year % 10)
}
