//! Weekday by hour grid of last-play timestamps, in the configured time zone.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

use super::clock::{self, PLAY_DATE};
use super::helpers;

pub const UNIT: &str = "lastplay_heatmap";

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Serialize)]
struct Heatmap {
    title: String,
    generated_at: DateTime<Utc>,
    time_zone: String,
    days: [&'static str; 7],
    /// `cells[day][hour]`, Monday first.
    cells: [[i64; 24]; 7],
    /// Tracks sharing a timestamp with an earlier track; counted once.
    duplicates_removed: usize,
    peak_day: &'static str,
    peak_hour: String,
}

pub fn run(dataset: &Dataset, params: &ParamBundle, output_prefix: &Path) -> anyhow::Result<PathBuf> {
    debug!("Starting {} analysis", UNIT);
    dataset.ensure_columns(&[PLAY_DATE])?;

    let played: Vec<DateTime<Utc>> = dataset
        .rows()
        .filter_map(|row| clock::date(row, PLAY_DATE))
        .collect();
    if played.is_empty() {
        anyhow::bail!("No tracks with Play Date UTC timestamps found");
    }

    let tz = clock::time_zone(params, UNIT);
    let mut seen = HashSet::new();
    let mut cells = [[0i64; 24]; 7];
    for when in &played {
        if seen.insert(*when) {
            let local = when.with_timezone(&tz);
            cells[local.weekday().num_days_from_monday() as usize][local.hour() as usize] += 1;
        }
    }
    let duplicates_removed = played.len() - seen.len();
    if duplicates_removed > 0 {
        debug!(unit = UNIT, "Removed {} tracks with duplicate timestamps", duplicates_removed);
    }

    let (peak_day, peak_hour) = peaks(&cells);
    let heatmap = Heatmap {
        title: "Listening Patterns by Day and Hour".to_string(),
        generated_at: Utc::now(),
        time_zone: tz.to_string(),
        days: DAYS,
        cells,
        duplicates_removed,
        peak_day: DAYS[peak_day],
        peak_hour: format!("{:02}:00", peak_hour),
    };
    if params.debug() {
        debug!(unit = UNIT, "Peak listening: {} at {}", heatmap.peak_day, heatmap.peak_hour);
    }
    helpers::write_json(output_prefix, &heatmap)
}

/// Busiest day and busiest hour, each summed over the other axis. Ties go
/// to the earlier one.
fn peaks(cells: &[[i64; 24]; 7]) -> (usize, usize) {
    let busiest = |totals: Vec<i64>| {
        totals
            .iter()
            .enumerate()
            .fold((0, i64::MIN), |best, (i, v)| if *v > best.1 { (i, *v) } else { best })
            .0
    };
    let by_day: Vec<i64> = cells.iter().map(|day| day.iter().sum()).collect();
    let by_hour: Vec<i64> = (0..24).map(|h| cells.iter().map(|day| day[h]).sum()).collect();
    (busiest(by_day), busiest(by_hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_prefer_earlier_on_ties() {
        let mut cells = [[0i64; 24]; 7];
        cells[2][5] = 3;
        cells[4][5] = 3;
        cells[4][22] = 1;
        assert_eq!(peaks(&cells), (4, 5));

        assert_eq!(peaks(&[[0; 24]; 7]), (0, 0));
    }
}
