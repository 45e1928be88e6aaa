use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;

use tracing::{debug, error, info};

use super::isolation::{self, JobFault, Outcome};
use super::job::JobDescriptor;
use super::process::{self, Staging, StagedJob, WorkerCommand};
use super::registry::UnitRegistry;
use super::worker;
use super::EngineError;

/// Where each job runs.
#[derive(Debug, Clone, Default)]
pub enum Isolation {
    /// On a pool thread of the calling process. Unit panics are contained,
    /// aborts are not.
    #[default]
    Thread,
    /// In a child process started from a pool thread, one per job.
    Process(WorkerCommand),
}

/// Worker pool configuration.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Number of workers. 0 = available parallelism.
    pub workers: usize,
    /// Debug logging inside workers.
    pub debug: bool,
    pub isolation: Isolation,
}

impl DispatchConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    /// Resolve worker count (0 means use available parallelism).
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.workers
        }
    }
}

/// Runs job descriptors on a fixed-size worker pool.
///
/// Each job goes to exactly one worker and runs to completion there. Jobs
/// carry their submission index, so results land in a pre-sized slot table
/// and come back in input order no matter which worker finishes first.
/// In [`Isolation::Process`] mode the pool threads only supervise child
/// processes, so the pool size bounds how many children run at once.
pub struct Dispatcher {
    pool: rayon::ThreadPool,
    registry: Arc<UnitRegistry>,
    workers: usize,
    isolation: Isolation,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig, registry: Arc<UnitRegistry>) -> Result<Self, EngineError> {
        let workers = config.resolved_workers();
        let debug = config.debug;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("analysis-worker-{}", i))
            .start_handler(move |i| {
                worker::init_worker(i, debug);
            })
            .build()
            .map_err(|e| EngineError::Pool(e.to_string()))?;

        let mode = match config.isolation {
            Isolation::Thread => "threads",
            Isolation::Process(_) => "processes",
        };
        info!("Dispatcher ready with {} workers ({})", workers, mode);
        Ok(Self {
            pool,
            registry,
            workers,
            isolation: config.isolation.clone(),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    /// Execute every job and block until all of them have an outcome.
    ///
    /// Returns exactly one [`Outcome`] per descriptor, positionally matched.
    pub fn run(&self, jobs: Vec<JobDescriptor>) -> Vec<Outcome> {
        let unit_ids: Vec<String> = jobs.iter().map(|j| j.unit_id.clone()).collect();
        let mut slots: Vec<Option<Outcome>> = (0..jobs.len()).map(|_| None).collect();
        debug!("Dispatching {} jobs to {} workers", jobs.len(), self.workers);

        // Lives until every child has exited; the directory goes with it.
        let mut staging = match self.isolation {
            Isolation::Thread => None,
            Isolation::Process(_) => {
                Some(Staging::new().map_err(|e| format!("failed to create staging directory: {}", e)))
            }
        };
        let tasks: Vec<(usize, JobDescriptor, Option<Result<StagedJob, String>>)> = jobs
            .into_iter()
            .enumerate()
            .map(|(index, job)| {
                let staged = match staging.as_mut() {
                    None => None,
                    Some(Ok(staging)) => Some(staging.stage(index, &job).map_err(|e| format!("{:#}", e))),
                    Some(Err(e)) => Some(Err(e.clone())),
                };
                (index, job, staged)
            })
            .collect();

        let (tx, rx) = mpsc::channel::<(usize, Outcome)>();
        let registry = self.registry.as_ref();
        let isolation = &self.isolation;
        self.pool.scope(move |scope| {
            for (index, job, staged) in tasks {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        run_one(registry, isolation, &job, staged)
                    }))
                    .unwrap_or_else(|_| {
                        error!(unit = %job.unit_id, "worker failed while supervising job");
                        Outcome::lost(&job.unit_id)
                    });
                    // The receiver outlives the scope; a send can only fail
                    // if the caller has already gone away.
                    let _ = tx.send((index, outcome));
                });
            }
        });

        for (index, outcome) in rx {
            slots[index] = Some(outcome);
        }
        drop(staging);

        slots
            .into_iter()
            .zip(unit_ids)
            .map(|(slot, unit_id)| {
                slot.unwrap_or_else(|| {
                    error!(unit = %unit_id, "no outcome reported for job");
                    Outcome::lost(&unit_id)
                })
            })
            .collect()
    }
}

fn run_one(
    registry: &UnitRegistry,
    isolation: &Isolation,
    job: &JobDescriptor,
    staged: Option<Result<StagedJob, String>>,
) -> Outcome {
    match (isolation, staged) {
        (Isolation::Process(command), Some(Ok(staged))) => {
            process::run_in_child(command, &job.unit_id, &staged)
        }
        (Isolation::Process(_), Some(Err(detail))) => isolation::failed(
            &job.unit_id,
            std::time::Duration::ZERO,
            JobFault::Execution {
                unit_id: job.unit_id.clone(),
                detail: format!("failed to stage worker input: {}", detail),
            },
        ),
        _ => isolation::execute(registry, job),
    }
}
