//! Built-in analysis units.
//!
//! Each unit module exposes `UNIT` (its stable name) and `run`, the entry
//! point the engine calls. Adding a unit means adding a module and a row in
//! [`REGISTRATIONS`].

pub mod album_avg_daily_plays;
pub mod album_minplayed;
pub mod album_plays;
pub mod album_skips;
pub mod artist_minplayed;
pub mod artist_plays;
pub mod artist_skip_ratio;
pub mod artist_tracks;
pub mod clock;
pub mod decade_plays;
pub mod genre_plays;
pub mod helpers;
pub mod historical_date_added;
pub mod historical_last_played;
pub mod kind_distribution;
pub mod lastplay_heatmap;
pub mod library_overview;
pub mod play_count_distribution;
pub mod playtime_by_hour;
pub mod playtime_by_month;
pub mod playtime_by_weekday;
pub mod plays_by_isoweek;
pub mod rating_plays;
pub mod track_avg_daily_plays;
pub mod track_minplayed;
pub mod track_play_ratio;

use std::path::{Path, PathBuf};

use tunegraph_core::{Dataset, ParamBundle};

use crate::engine::{RegistryError, UnitRegistry};

type UnitFn = fn(&Dataset, &ParamBundle, &Path) -> anyhow::Result<PathBuf>;

/// Explicit registration table.
const REGISTRATIONS: &[(&str, UnitFn)] = &[
    (album_avg_daily_plays::UNIT, album_avg_daily_plays::run),
    (album_minplayed::UNIT, album_minplayed::run),
    (album_plays::UNIT, album_plays::run),
    (album_skips::UNIT, album_skips::run),
    (artist_minplayed::UNIT, artist_minplayed::run),
    (artist_plays::UNIT, artist_plays::run),
    (artist_skip_ratio::UNIT, artist_skip_ratio::run),
    (artist_tracks::UNIT, artist_tracks::run),
    (decade_plays::UNIT, decade_plays::run),
    (genre_plays::UNIT, genre_plays::run),
    (historical_date_added::UNIT, historical_date_added::run),
    (historical_last_played::UNIT, historical_last_played::run),
    (kind_distribution::UNIT, kind_distribution::run),
    (lastplay_heatmap::UNIT, lastplay_heatmap::run),
    (library_overview::UNIT, library_overview::run),
    (play_count_distribution::UNIT, play_count_distribution::run),
    (playtime_by_hour::UNIT, playtime_by_hour::run),
    (playtime_by_month::UNIT, playtime_by_month::run),
    (playtime_by_weekday::UNIT, playtime_by_weekday::run),
    (plays_by_isoweek::UNIT, plays_by_isoweek::run),
    (rating_plays::UNIT, rating_plays::run),
    (track_avg_daily_plays::UNIT, track_avg_daily_plays::run),
    (track_minplayed::UNIT, track_minplayed::run),
    (track_play_ratio::UNIT, track_play_ratio::run),
];

/// Registry pre-populated with every built-in unit.
pub fn builtin_registry() -> Result<UnitRegistry, RegistryError> {
    let mut registry = UnitRegistry::new();
    for (name, run) in REGISTRATIONS {
        registry.register(name, *run)?;
    }
    Ok(registry)
}
