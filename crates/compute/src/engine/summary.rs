use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::isolation::{JobFault, Outcome};

/// One failed job as listed in the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub unit_id: String,
    pub message: String,
    pub fault: JobFault,
}

/// Read-only view over a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Outcomes in submission order.
    #[serde(skip)]
    pub outcomes: Vec<Outcome>,
    /// Wall-clock time around the whole dispatch, not a sum of job times.
    pub elapsed: Duration,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FailureEntry>,
}

/// Partition outcomes into successes and failures.
///
/// `elapsed` is measured by the caller around the dispatch call.
pub fn summarize(outcomes: Vec<Outcome>, elapsed: Duration) -> BatchSummary {
    let failures: Vec<FailureEntry> = outcomes
        .iter()
        .filter_map(|o| {
            o.fault().map(|fault| FailureEntry {
                unit_id: o.unit_id.clone(),
                message: fault.detail().to_string(),
                fault: fault.clone(),
            })
        })
        .collect();
    let total = outcomes.len();

    BatchSummary {
        succeeded: total - failures.len(),
        total,
        failures,
        elapsed,
        outcomes,
    }
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> &[FailureEntry] {
        &self.failures
    }

    /// No job succeeded although at least one was submitted.
    pub fn is_fatal(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }

    pub fn headline(&self) -> String {
        format!(
            "{} analyses completed in {:.2} seconds.",
            self.total,
            self.elapsed.as_secs_f64()
        )
    }

    /// Emit the summary line, one line per artifact and a failure count.
    /// Individual failures were already logged when they happened.
    pub fn log(&self) {
        info!("{}", self.headline());
        for outcome in self.successes() {
            info!(
                unit = %outcome.unit_id,
                "{} ({:.2}s)",
                outcome.artifact_str(),
                outcome.elapsed.as_secs_f64()
            );
        }
        if !self.failures.is_empty() {
            warn!("{} of {} analyses failed", self.failures.len(), self.total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    struct CountWarnings(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for CountWarnings {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn ok(unit: &str, ms: u64) -> Outcome {
        Outcome {
            unit_id: unit.to_string(),
            elapsed: Duration::from_millis(ms),
            result: Ok(PathBuf::from(format!("/out/{}.json", unit))),
        }
    }

    fn err(unit: &str, detail: &str) -> Outcome {
        Outcome {
            unit_id: unit.to_string(),
            elapsed: Duration::from_millis(1),
            result: Err(JobFault::Execution {
                unit_id: unit.to_string(),
                detail: detail.to_string(),
            }),
        }
    }

    #[test]
    fn partitions_and_keeps_order() {
        let summary = summarize(
            vec![err("z", "first"), ok("a", 10), err("b", "second")],
            Duration::from_secs(2),
        );
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.failure_count(), 2);
        assert_eq!(summary.successes().count(), 1);
        let failed: Vec<(&str, &str)> = summary
            .failures()
            .iter()
            .map(|f| (f.unit_id.as_str(), f.message.as_str()))
            .collect();
        assert_eq!(failed, vec![("z", "first"), ("b", "second")]);
        assert!(!summary.is_fatal());
    }

    #[test]
    fn elapsed_is_the_wall_clock_not_the_sum() {
        let summary = summarize(vec![ok("a", 900), ok("b", 900)], Duration::from_millis(1000));
        assert_eq!(summary.elapsed, Duration::from_millis(1000));
        assert_eq!(summary.headline(), "2 analyses completed in 1.00 seconds.");
    }

    #[test]
    fn all_failed_is_fatal() {
        let summary = summarize(vec![err("a", "x"), err("b", "y")], Duration::ZERO);
        assert!(summary.is_fatal());
    }

    #[test]
    fn empty_batch_is_not_fatal() {
        let summary = summarize(Vec::new(), Duration::ZERO);
        assert_eq!(summary.total(), 0);
        assert!(!summary.is_fatal());
    }

    #[test]
    fn serializes_without_outcomes() {
        let summary = summarize(vec![ok("a", 1), err("b", "boom")], Duration::from_secs(1));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failures"][0]["unit_id"], "b");
        assert_eq!(json["failures"][0]["fault"]["kind"], "execution");
        assert!(json.get("outcomes").is_none());
    }

    #[test]
    fn log_reports_failures_as_one_count() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountWarnings(Arc::clone(&warnings)));
        let summary = summarize(
            vec![err("a", "x"), ok("b", 1), err("c", "y"), err("d", "z")],
            Duration::from_secs(1),
        );

        tracing::subscriber::with_default(subscriber, || summary.log());

        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }
}
