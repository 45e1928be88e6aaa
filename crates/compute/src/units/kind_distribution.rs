//! Track count per file kind ("MPEG audio file", "AAC audio file", ...).

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, Chart, KIND};

pub const UNIT: &str = "kind_distribution";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[KIND])?;

    let totals = helpers::sum_by(dataset.rows(), |row| {
        helpers::text(row, KIND).map(|kind| (kind.to_string(), 1))
    });

    let chart = Chart::new(
        "Tracks by Kind",
        "Number of Tracks",
        KIND,
        helpers::top_n(totals, params.top_for(UNIT)),
    );
    chart.write(UNIT, params, output_prefix)
}
