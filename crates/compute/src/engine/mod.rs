//! Batch orchestration engine.
//!
//! Flow: [`UnitRegistry`] discovers units, [`job::build`] turns them into
//! descriptors, the [`Dispatcher`] runs each one through
//! [`isolation::execute`] on a worker pool (on the pool thread itself, or in
//! a child process via [`process`]), and [`summarize`] folds the outcomes
//! into a [`BatchSummary`].

pub mod dispatcher;
pub mod isolation;
pub mod job;
pub mod process;
pub mod registry;
pub mod summary;
pub mod worker;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use tunegraph_core::{Dataset, ParamBundle};

pub use dispatcher::{DispatchConfig, Dispatcher, Isolation};
pub use isolation::{JobFault, Outcome};
pub use job::JobDescriptor;
pub use process::{run_worker, WorkerCommand, WorkerReport, RUN_JOB_FLAG};
pub use registry::{EntryPoint, RegistryError, UnitDefinition, UnitRegistry, RESERVED_PREFIX};
pub use summary::{BatchSummary, FailureEntry, summarize};

/// Batch-level failures. Raised before dispatch; no outcomes are produced.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("dataset is empty: no tracks to analyse")]
    EmptyDataset,
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("failed to build worker pool: {0}")]
    Pool(String),
    #[error("unit registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Caller-facing entry point: discovery plus synchronous batch runs.
pub struct AnalysisEngine {
    dispatcher: Dispatcher,
}

impl AnalysisEngine {
    pub fn new(registry: UnitRegistry, config: &DispatchConfig) -> Result<Self, EngineError> {
        let dispatcher = Dispatcher::new(config, Arc::new(registry))?;
        Ok(Self { dispatcher })
    }

    /// Engine over the built-in analysis units.
    pub fn with_builtin_units(config: &DispatchConfig) -> Result<Self, EngineError> {
        Self::new(crate::units::builtin_registry()?, config)
    }

    /// Sorted runnable unit names.
    pub fn discover(&self) -> Vec<String> {
        self.dispatcher.registry().discover()
    }

    pub fn workers(&self) -> usize {
        self.dispatcher.workers()
    }

    /// Run one job per unit id and block until all of them finished.
    ///
    /// An empty dataset or invalid parameters abort before any job is
    /// dispatched. Per-job faults never abort; they show up in the summary.
    pub fn run_batch(
        &self,
        dataset: Arc<Dataset>,
        unit_ids: &[String],
        params: ParamBundle,
        output_dir: &Path,
    ) -> Result<BatchSummary, EngineError> {
        if dataset.is_empty() {
            return Err(EngineError::EmptyDataset);
        }
        params.validate().map_err(EngineError::InvalidParam)?;

        let jobs = job::build(unit_ids, &dataset, &Arc::new(params), output_dir);
        info!(
            "Running {} analyses over {} tracks with {} workers",
            jobs.len(),
            dataset.len(),
            self.dispatcher.workers()
        );

        let start = Instant::now();
        let outcomes = self.dispatcher.run(jobs);
        Ok(summarize(outcomes, start.elapsed()))
    }
}
