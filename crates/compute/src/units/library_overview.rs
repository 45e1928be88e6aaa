//! Headline numbers for the whole library.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, ALBUM, ARTIST, GENRE, TOTAL_TIME};

pub const UNIT: &str = "library_overview";

#[derive(Debug, Serialize)]
struct Overview {
    generated_at: DateTime<Utc>,
    tracks: usize,
    artists: usize,
    albums: usize,
    genres: usize,
    total_plays: i64,
    /// Sum of track lengths, in hours.
    library_hours: f64,
    /// Sum of length x plays, in hours.
    listening_hours: f64,
}

pub fn run(dataset: &Dataset, _params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);

    let mut artists = HashSet::new();
    let mut albums = HashSet::new();
    let mut genres = HashSet::new();
    let mut total_plays = 0i64;
    let mut library_ms = 0i64;
    let mut listening_ms = 0i64;

    for row in dataset.rows() {
        let artist = helpers::text(row, ARTIST);
        if let Some(a) = artist {
            artists.insert(a);
        }
        if let Some(album) = helpers::text(row, ALBUM) {
            albums.insert((artist, album));
        }
        if let Some(g) = helpers::text(row, GENRE) {
            genres.insert(g);
        }
        let plays = helpers::play_count(row);
        let length_ms = helpers::int_or_zero(row, TOTAL_TIME).max(0);
        total_plays = total_plays.saturating_add(plays);
        library_ms = library_ms.saturating_add(length_ms);
        listening_ms = listening_ms.saturating_add(length_ms.saturating_mul(plays));
    }

    let overview = Overview {
        generated_at: Utc::now(),
        tracks: dataset.len(),
        artists: artists.len(),
        albums: albums.len(),
        genres: genres.len(),
        total_plays,
        library_hours: ms_to_hours(library_ms),
        listening_hours: ms_to_hours(listening_ms),
    };
    helpers::write_json(output_prefix, &overview)
}

fn ms_to_hours(ms: i64) -> f64 {
    ms as f64 / 3_600_000.0
}
