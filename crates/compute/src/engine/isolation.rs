//! Per-job fault isolation.
//!
//! [`execute`] is what a worker runs for every job. It never panics and never
//! returns an error: resolution failures, missing entry points, unit errors
//! and unit panics all become a failed [`Outcome`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::job::JobDescriptor;
use super::registry::UnitRegistry;

/// Why a single job failed. Never crosses the pool boundary as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobFault {
    #[error("analysis unit '{unit_id}' not found: {detail}")]
    NotFound { unit_id: String, detail: String },

    #[error("unit '{unit_id}' has no run entry point")]
    MissingEntryPoint { unit_id: String },

    #[error("error running unit '{unit_id}': {detail}")]
    Execution { unit_id: String, detail: String },

    /// The worker went away before reporting: a child process exited
    /// without writing its report, or a pool thread failed while
    /// supervising the job. Still yields an outcome.
    #[error("worker for unit '{unit_id}' exited without reporting an outcome")]
    Lost { unit_id: String },
}

impl JobFault {
    /// The message without the unit prefix, as shown in failure listings.
    pub fn detail(&self) -> &str {
        match self {
            JobFault::NotFound { detail, .. } | JobFault::Execution { detail, .. } => detail,
            JobFault::MissingEntryPoint { .. } => "no run entry point",
            JobFault::Lost { .. } => "worker exited without reporting an outcome",
        }
    }
}

/// Result of one job: which unit, how long it took, and what it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub unit_id: String,
    pub elapsed: Duration,
    pub result: Result<PathBuf, JobFault>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.result.as_ref().ok().map(|p| p.as_path())
    }

    /// Artifact path as text; empty on failure.
    pub fn artifact_str(&self) -> String {
        self.artifact_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    pub fn fault(&self) -> Option<&JobFault> {
        self.result.as_ref().err()
    }

    pub(crate) fn lost(unit_id: &str) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            elapsed: Duration::ZERO,
            result: Err(JobFault::Lost {
                unit_id: unit_id.to_string(),
            }),
        }
    }
}

/// Resolve, validate and run one job. Single pass, no retries.
pub fn execute(registry: &UnitRegistry, job: &JobDescriptor) -> Outcome {
    let started = Instant::now();
    let unit_id = job.unit_id.as_str();

    let Some(unit) = registry.resolve(unit_id) else {
        return failed(
            unit_id,
            started.elapsed(),
            JobFault::NotFound {
                unit_id: unit_id.to_string(),
                detail: "no unit registered under this name".to_string(),
            },
        );
    };

    let Some(run) = unit.entry_point() else {
        return failed(
            unit_id,
            started.elapsed(),
            JobFault::MissingEntryPoint {
                unit_id: unit_id.to_string(),
            },
        );
    };

    debug!(unit = unit_id, prefix = %job.output_prefix.display(), "running unit");
    let invoked = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        (run.as_ref())(job.dataset.as_ref(), job.params.as_ref(), &job.output_prefix)
    }));
    let elapsed = invoked.elapsed();

    let detail = match result {
        Ok(Ok(path)) if !path.as_os_str().is_empty() => {
            debug!(unit = unit_id, artifact = %path.display(), "unit finished in {:.2}s", elapsed.as_secs_f64());
            return Outcome {
                unit_id: unit_id.to_string(),
                elapsed,
                result: Ok(path),
            };
        }
        Ok(Ok(_)) => "unit returned an empty artifact path".to_string(),
        Ok(Err(e)) => format!("{:#}", e),
        Err(payload) => panic_message(payload.as_ref()),
    };

    failed(
        unit_id,
        elapsed,
        JobFault::Execution {
            unit_id: unit_id.to_string(),
            detail,
        },
    )
}

/// Failed outcome for `unit_id`, logged once here.
pub(crate) fn failed(unit_id: &str, elapsed: Duration, fault: JobFault) -> Outcome {
    warn!(unit = unit_id, "{}", fault);
    Outcome {
        unit_id: unit_id.to_string(),
        elapsed,
        result: Err(fault),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tunegraph_core::{Dataset, ParamBundle};

    fn job(unit_id: &str) -> JobDescriptor {
        JobDescriptor {
            unit_id: unit_id.to_string(),
            dataset: Arc::new(Dataset::default()),
            params: Arc::new(ParamBundle::new().with("top", 3)),
            output_prefix: PathBuf::from("/out").join(unit_id),
        }
    }

    fn registry() -> UnitRegistry {
        let mut registry = UnitRegistry::new();
        registry
            .register("ok", |_: &Dataset, _: &ParamBundle, prefix: &Path| {
                Ok(prefix.with_extension("png"))
            })
            .unwrap();
        registry.declare("stub").unwrap();
        registry
            .register("fails", |_: &Dataset, _: &ParamBundle, _: &Path| {
                Err(anyhow::anyhow!("boom"))
            })
            .unwrap();
        registry
            .register("panics", |_: &Dataset, _: &ParamBundle, _: &Path| -> anyhow::Result<PathBuf> {
                panic!("index out of range")
            })
            .unwrap();
        registry
            .register("empty", |_: &Dataset, _: &ParamBundle, _: &Path| Ok(PathBuf::new()))
            .unwrap();
        registry
    }

    #[test]
    fn success_returns_artifact_path() {
        let outcome = execute(&registry(), &job("ok"));
        assert!(outcome.is_success());
        assert_eq!(outcome.unit_id, "ok");
        assert_eq!(outcome.artifact_str(), "/out/ok.png");
    }

    #[test]
    fn unknown_unit_is_not_found() {
        let outcome = execute(&registry(), &job("missing"));
        assert_eq!(outcome.artifact_str(), "");
        let fault = outcome.fault().unwrap();
        assert!(matches!(fault, JobFault::NotFound { .. }));
        assert!(fault.to_string().starts_with("analysis unit 'missing' not found: "));
    }

    #[test]
    fn declared_unit_without_entry_point() {
        let outcome = execute(&registry(), &job("stub"));
        let fault = outcome.fault().unwrap();
        assert_eq!(fault.to_string(), "unit 'stub' has no run entry point");
        assert_eq!(fault.detail(), "no run entry point");
    }

    #[test]
    fn unit_error_keeps_failure_detail() {
        let outcome = execute(&registry(), &job("fails"));
        let fault = outcome.fault().unwrap();
        assert_eq!(fault.to_string(), "error running unit 'fails': boom");
        assert_eq!(fault.detail(), "boom");
    }

    #[test]
    fn unit_panic_is_contained() {
        let outcome = execute(&registry(), &job("panics"));
        let fault = outcome.fault().unwrap();
        assert!(matches!(fault, JobFault::Execution { .. }));
        assert!(fault.detail().contains("index out of range"));
    }

    #[test]
    fn empty_artifact_path_is_a_failure() {
        let outcome = execute(&registry(), &job("empty"));
        assert!(!outcome.is_success());
        assert!(outcome.fault().unwrap().detail().contains("empty artifact path"));
    }

    #[test]
    fn elapsed_recorded_for_failures() {
        let slow = {
            let mut r = UnitRegistry::new();
            r.register("slow_fail", |_: &Dataset, _: &ParamBundle, _: &Path| {
                std::thread::sleep(Duration::from_millis(20));
                Err(anyhow::anyhow!("late"))
            })
            .unwrap();
            r
        };
        let outcome = execute(&slow, &job("slow_fail"));
        assert!(!outcome.is_success());
        assert!(outcome.elapsed >= Duration::from_millis(20));
    }
}
