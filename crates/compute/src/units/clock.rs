//! Date handling for the time-based units. Not a runnable unit.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing::warn;
use tunegraph_core::params::TIME_ZONE;
use tunegraph_core::{FieldValue, ParamBundle, ParamValue, Row};

use super::helpers::{Entry, PLAY_COUNT, TOTAL_TIME};

pub const PLAY_DATE: &str = "Play Date UTC";
pub const DATE_ADDED: &str = "Date Added";

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Zone from the unit's `time_zone` option. Unknown names fall back to
/// [`DEFAULT_TIME_ZONE`].
pub fn time_zone(params: &ParamBundle, unit: &str) -> Tz {
    let Some(name) = params.get_for(unit, TIME_ZONE).and_then(ParamValue::as_str) else {
        return DEFAULT_TIME_ZONE;
    };
    name.parse().unwrap_or_else(|_| {
        warn!(unit, zone = name, "unknown time zone, using {}", DEFAULT_TIME_ZONE);
        DEFAULT_TIME_ZONE
    })
}

pub fn date(row: &Row, column: &str) -> Option<DateTime<Utc>> {
    row.get(column).and_then(FieldValue::as_date)
}

/// Whole calendar days from `since` to `until`, at least one.
pub fn days_between(since: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    (until.date_naive() - since.date_naive()).num_days().max(1)
}

/// Hours spent on a track: play count times track length.
pub fn play_hours(row: &Row) -> f64 {
    let plays = row.get(PLAY_COUNT).and_then(FieldValue::as_f64).unwrap_or(0.0);
    let length_ms = row.get(TOTAL_TIME).and_then(FieldValue::as_f64).unwrap_or(0.0);
    (plays * length_ms).max(0.0) / MS_PER_HOUR
}

/// Count dates per calendar quarter from the first to the last one seen.
/// Quarters in between without any date are kept with a zero count.
pub fn per_quarter(dates: impl Iterator<Item = DateTime<Utc>>) -> Vec<Entry> {
    let mut counts: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for date in dates {
        *counts.entry((date.year(), date.month0() / 3 + 1)).or_default() += 1;
    }
    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let (mut year, mut quarter) = first;
    while (year, quarter) <= last {
        entries.push(Entry {
            label: format!("{} Q{}", year, quarter),
            value: counts.get(&(year, quarter)).copied().unwrap_or(0),
        });
        if quarter == 4 {
            year += 1;
            quarter = 1;
        } else {
            quarter += 1;
        }
    }
    entries
}

/// Fixed-size buckets of hours, indexed from zero.
pub fn hour_buckets<const N: usize>(
    rows: impl Iterator<Item = (usize, f64)>,
) -> [f64; N] {
    let mut buckets = [0.0; N];
    for (index, hours) in rows {
        if let Some(bucket) = buckets.get_mut(index) {
            *bucket += hours;
        }
    }
    buckets
}
