//! Shared helpers for analysis units. Not a runnable unit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use tunegraph_core::{ParamBundle, Row};

pub const ARTIST: &str = "Artist";
pub const ALBUM: &str = "Album";
pub const ALBUM_ARTIST: &str = "Album Artist";
pub const NAME: &str = "Name";
pub const SKIP_COUNT: &str = "Skip Count";
pub const GENRE: &str = "Genre";
pub const KIND: &str = "Kind";
pub const PLAY_COUNT: &str = "Play Count";
pub const RATING: &str = "Rating";
pub const TOTAL_TIME: &str = "Total Time";
pub const YEAR: &str = "Year";

/// Trimmed, non-empty text value of `column`.
pub fn text<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Numeric value of `column`, 0 when absent or unparsable.
pub fn int_or_zero(row: &Row, column: &str) -> i64 {
    row.get(column).and_then(|v| v.as_i64()).unwrap_or(0)
}

pub fn play_count(row: &Row) -> i64 {
    int_or_zero(row, PLAY_COUNT).max(0)
}

pub fn skip_count(row: &Row) -> i64 {
    int_or_zero(row, SKIP_COUNT).max(0)
}

/// Library ratings run 0-100; convert to 0-5 stars.
pub fn rating_to_stars(rating: i64) -> i64 {
    ((rating as f64 / 20.0).round() as i64).clamp(0, 5)
}

/// Shorten a label to `max_len` characters, marking the cut with an ellipsis.
pub fn trim_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let cut: String = label.chars().take(max_len).collect();
        format!("{}…", cut.trim_end())
    }
}

/// `Artist: “Title”`, with the title shortened.
pub fn track_label(artist: &str, title: &str) -> String {
    format!("{}: “{}”", artist, trim_label(title, 32))
}

/// `Artist: Album`, with the album shortened.
pub fn album_label(artist: &str, album: &str) -> String {
    format!("{}: {}", artist, trim_label(album, 32))
}

/// Highest `n` entries by value, ties broken by label.
pub fn top_n(totals: HashMap<String, i64>, n: usize) -> Vec<Entry> {
    let mut entries: Vec<Entry> = totals
        .into_iter()
        .map(|(label, value)| Entry { label, value })
        .collect();
    entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(n);
    entries
}

/// Accumulate `(label, amount)` pairs produced by `f` across rows.
pub fn sum_by<'a, I, F>(rows: I, f: F) -> HashMap<String, i64>
where
    I: Iterator<Item = &'a Row>,
    F: Fn(&Row) -> Option<(String, i64)>,
{
    let mut totals: HashMap<String, i64> = HashMap::new();
    for (label, amount) in rows.filter_map(|row| f(row)) {
        let total = totals.entry(label).or_default();
        *total = total.saturating_add(amount);
    }
    totals
}

/// Highest `n` of `values`, ties broken by label.
pub fn top_n_f64(mut values: Vec<(String, f64)>, n: usize) -> Vec<Entry<f64>> {
    values.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    values.truncate(n);
    values
        .into_iter()
        .map(|(label, value)| Entry { label, value })
        .collect()
}

/// Percentile with linear interpolation between closest ranks. `sorted`
/// must be ascending and non-empty.
pub fn percentile(sorted: &[i64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] as f64 + (sorted[upper] - sorted[lower]) as f64 * fraction
}

/// Share of `out_of` with a play count of at least N, for N from 1 up to
/// the 99th percentile of `played`. Every value in `played` must be positive.
pub fn min_played_curve(played: &mut [i64], out_of: usize) -> Vec<Entry<f64>> {
    if played.is_empty() || out_of == 0 {
        return Vec::new();
    }
    played.sort_unstable();
    let max_plays = percentile(played, 99.0) as i64;
    (1..=max_plays)
        .map(|n| {
            let reached = played.len() - played.partition_point(|c| *c < n);
            Entry {
                label: n.to_string(),
                value: reached as f64 * 100.0 / out_of as f64,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<V = i64> {
    pub label: String,
    pub value: V,
}

/// The artifact every ranking-style unit writes.
#[derive(Debug, Serialize)]
pub struct Chart<V = i64> {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<Entry<V>>,
}

impl<V: Serialize> Chart<V> {
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str, entries: Vec<Entry<V>>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            generated_at: Utc::now(),
            entries,
        }
    }

    /// Write to `<prefix>.json`. With the `debug` option set the entries are
    /// logged as well.
    pub fn write(&self, unit: &str, params: &ParamBundle, prefix: &Path) -> anyhow::Result<PathBuf>
    where
        V: std::fmt::Debug,
    {
        if params.debug() {
            for entry in &self.entries {
                debug!(unit, "{} = {:?}", entry.label, entry.value);
            }
        }
        write_json(prefix, self)
    }
}

/// Write `value` as pretty JSON to `<prefix>.json` and return that path.
pub fn write_json<T: Serialize>(prefix: &Path, value: &T) -> anyhow::Result<PathBuf> {
    let path = prefix.with_extension("json");
    let body = serde_json::to_string_pretty(value).context("failed to serialize artifact")?;
    std::fs::write(&path, body)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunegraph_core::FieldValue;

    #[test]
    fn stars_are_clamped_and_rounded() {
        assert_eq!(rating_to_stars(0), 0);
        assert_eq!(rating_to_stars(20), 1);
        assert_eq!(rating_to_stars(50), 3);
        assert_eq!(rating_to_stars(100), 5);
        assert_eq!(rating_to_stars(140), 5);
        assert_eq!(rating_to_stars(-20), 0);
    }

    #[test]
    fn trim_label_adds_ellipsis() {
        assert_eq!(trim_label("short", 32), "short");
        assert_eq!(trim_label("abcdef ghij", 7), "abcdef…");
    }

    #[test]
    fn top_n_orders_by_value_then_label() {
        let totals: HashMap<String, i64> = [("b", 5), ("a", 5), ("c", 9), ("d", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let labels: Vec<String> = top_n(totals, 3).into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }

    #[test]
    fn text_ignores_blank_values() {
        let row: Row = [
            ("Artist".to_string(), FieldValue::Text("  ".into())),
            ("Album".to_string(), FieldValue::Text(" X ".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(text(&row, ARTIST), None);
        assert_eq!(text(&row, ALBUM), Some("X"));
        assert_eq!(play_count(&row), 0);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let rows: Vec<Row> = (0..2)
            .map(|_| {
                [
                    ("Artist".to_string(), FieldValue::Text("A".into())),
                    ("Play Count".to_string(), FieldValue::Integer(i64::MAX)),
                ]
                .into_iter()
                .collect()
            })
            .collect();
        let totals = sum_by(rows.iter(), |row| text(row, ARTIST).map(|a| (a.to_string(), play_count(row))));
        assert_eq!(totals["A"], i64::MAX);
    }

    #[test]
    fn percentile_interpolates() {
        assert_eq!(percentile(&[5], 99.0), 5.0);
        assert_eq!(percentile(&[1, 2, 3, 4, 5], 50.0), 3.0);
        assert!((percentile(&[1, 101], 99.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn min_played_curve_counts_at_least_n() {
        let mut played = vec![3, 1, 2, 3];
        let curve = min_played_curve(&mut played, 8);
        let values: Vec<f64> = curve.iter().map(|e| e.value).collect();
        assert_eq!(curve.iter().map(|e| e.label.as_str()).collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(values, vec![50.0, 37.5, 25.0]);
        assert!(min_played_curve(&mut [], 3).is_empty());
    }

    #[test]
    fn float_ranking_breaks_ties_by_label() {
        let entries = top_n_f64(
            vec![("b".into(), 0.5), ("a".into(), 0.5), ("c".into(), 2.0)],
            2,
        );
        assert_eq!(entries[0], Entry { label: "c".into(), value: 2.0 });
        assert_eq!(entries[1].label, "a");
    }

    #[test]
    fn labels() {
        assert_eq!(track_label("A", "Song"), "A: “Song”");
        assert_eq!(album_label("A", "Record"), "A: Record");
    }

    #[test]
    fn write_json_uses_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(&dir.path().join("unit"), &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(path, dir.path().join("unit.json"));
        assert!(std::fs::read_to_string(path).unwrap().contains("\"a\": 1"));
    }
}
