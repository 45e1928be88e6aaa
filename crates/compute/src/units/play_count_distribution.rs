//! How many tracks fall into each play-count bucket.

use std::path::{Path, PathBuf};

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::helpers::{self, Chart, Entry, PLAY_COUNT};

pub const UNIT: &str = "play_count_distribution";

/// Inclusive lower bounds; the last bucket is open-ended.
const BUCKETS: [i64; 7] = [0, 1, 5, 10, 25, 50, 100];

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_COUNT])?;

    let mut counts = [0i64; BUCKETS.len()];
    for row in dataset.rows() {
        counts[bucket_index(helpers::play_count(row))] += 1;
    }

    let entries = counts
        .iter()
        .enumerate()
        .map(|(i, count)| Entry {
            label: bucket_label(i),
            value: *count,
        })
        .collect();

    let chart = Chart::new("Play Count Distribution", "Play Count", "Number of Tracks", entries);
    chart.write(UNIT, params, output_prefix)
}

fn bucket_index(plays: i64) -> usize {
    BUCKETS.iter().rposition(|lower| plays >= *lower).unwrap_or(0)
}

fn bucket_label(i: usize) -> String {
    match BUCKETS.get(i + 1) {
        Some(next) if next - BUCKETS[i] == 1 => BUCKETS[i].to_string(),
        Some(next) => format!("{}-{}", BUCKETS[i], next - 1),
        None => format!("{}+", BUCKETS[i]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(bucket_index(0), 0);
        assert_eq!(bucket_index(1), 1);
        assert_eq!(bucket_index(4), 1);
        assert_eq!(bucket_index(5), 2);
        assert_eq!(bucket_index(99), 5);
        assert_eq!(bucket_index(5000), 6);
    }

    #[test]
    fn labels() {
        assert_eq!(bucket_label(0), "0");
        assert_eq!(bucket_label(1), "1-4");
        assert_eq!(bucket_label(6), "100+");
    }
}
