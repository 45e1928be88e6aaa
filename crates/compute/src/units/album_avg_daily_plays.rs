//! Albums with the most plays per day since their first track was added,
//! top N.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, DATE_ADDED};
use super::helpers::{self, ALBUM, ALBUM_ARTIST, Chart, PLAY_COUNT};

pub const UNIT: &str = "album_avg_daily_plays";

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_COUNT, DATE_ADDED, ALBUM, ALBUM_ARTIST])?;

    let top = params.top_for(UNIT);
    let mut albums: HashMap<(&str, &str), (i64, DateTime<Utc>)> = HashMap::new();
    for row in dataset.rows_with(&[PLAY_COUNT, DATE_ADDED, ALBUM, ALBUM_ARTIST]) {
        let (Some(artist), Some(album), Some(added)) = (
            helpers::text(row, ALBUM_ARTIST),
            helpers::text(row, ALBUM),
            clock::date(row, DATE_ADDED),
        ) else {
            continue;
        };
        let plays = helpers::play_count(row);
        albums
            .entry((artist, album))
            .and_modify(|(total, earliest)| {
                *total = total.saturating_add(plays);
                *earliest = (*earliest).min(added);
            })
            .or_insert((plays, added));
    }

    let today = Utc::now();
    let averages = albums
        .into_iter()
        .map(|((artist, album), (plays, earliest))| {
            let days = clock::days_between(earliest, today);
            (helpers::album_label(artist, album), plays as f64 / days as f64)
        })
        .collect();

    let chart = Chart::new(
        format!("Top {} Albums by Average Daily Plays", top),
        "Average Daily Plays",
        ALBUM,
        helpers::top_n_f64(averages, top),
    );
    chart.write(UNIT, params, output_prefix)
}
