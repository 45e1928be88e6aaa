//! Tracks added to the library per quarter.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, DATE_ADDED};
use super::helpers::Chart;

pub const UNIT: &str = "historical_date_added";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[DATE_ADDED])?;

    let entries = clock::per_quarter(dataset.rows().filter_map(|row| clock::date(row, DATE_ADDED)));

    let chart = Chart::new(
        "Tracks Imported Per Quarter Over Time",
        "Quarter",
        "Number of Tracks Imported",
        entries,
    );
    chart.write(UNIT, params, output_prefix)
}
