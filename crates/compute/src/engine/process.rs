//! Process-per-job execution.
//!
//! In process mode every job runs in a fresh child process started from a
//! pool thread, so a unit that aborts, overflows its stack or is killed by a
//! signal only takes its own job down. The parent stages the dataset and
//! parameters once per batch in a temporary directory, writes one job file
//! per descriptor, and reads back the report file the child leaves behind.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, warn};
use tunegraph_core::{Dataset, ParamBundle};

use super::isolation::{self, JobFault, Outcome};
use super::job::JobDescriptor;
use super::registry::UnitRegistry;
use super::worker;

/// Flag the worker binary recognises; followed by the job file path.
pub const RUN_JOB_FLAG: &str = "--run-job";

/// How to start a worker process. `--run-job <file>` is appended to the
/// configured arguments for every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Re-run the executable of the current process.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    fn command(&self, job_file: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(RUN_JOB_FLAG)
            .arg(job_file)
            .stdin(Stdio::null());
        command
    }
}

/// One job as a worker process reads it. Shared inputs are referenced by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerJob {
    pub unit_id: String,
    pub dataset: PathBuf,
    pub params: PathBuf,
    pub output_prefix: PathBuf,
    pub report: PathBuf,
}

/// What a worker process writes back for the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerReport {
    Done { artifact: PathBuf },
    Failed { fault: JobFault },
}

/// Files the parent prepared for one job.
#[derive(Debug)]
pub(crate) struct StagedJob {
    job_file: PathBuf,
    report: PathBuf,
}

/// Per-batch temporary directory holding serialized inputs. Removed on drop.
pub(crate) struct Staging {
    dir: TempDir,
    datasets: Vec<(Arc<Dataset>, PathBuf)>,
    params: Vec<(Arc<ParamBundle>, PathBuf)>,
}

impl Staging {
    pub(crate) fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("tunegraph-batch-").tempdir()?,
            datasets: Vec::new(),
            params: Vec::new(),
        })
    }

    /// Write the job file for `job`. Datasets and bundles shared between
    /// descriptors are written once.
    pub(crate) fn stage(&mut self, index: usize, job: &JobDescriptor) -> anyhow::Result<StagedJob> {
        let dataset = match self.datasets.iter().find(|(d, _)| Arc::ptr_eq(d, &job.dataset)) {
            Some((_, path)) => path.clone(),
            None => {
                let path = self.dir.path().join(format!("dataset-{}.json", self.datasets.len()));
                write_json(&path, job.dataset.as_ref())?;
                self.datasets.push((Arc::clone(&job.dataset), path.clone()));
                path
            }
        };
        let params = match self.params.iter().find(|(p, _)| Arc::ptr_eq(p, &job.params)) {
            Some((_, path)) => path.clone(),
            None => {
                let path = self.dir.path().join(format!("params-{}.json", self.params.len()));
                write_json(&path, job.params.as_ref())?;
                self.params.push((Arc::clone(&job.params), path.clone()));
                path
            }
        };

        let staged = StagedJob {
            job_file: self.dir.path().join(format!("job-{}.json", index)),
            report: self.dir.path().join(format!("report-{}.json", index)),
        };
        let worker_job = WorkerJob {
            unit_id: job.unit_id.clone(),
            dataset,
            params,
            output_prefix: job.output_prefix.clone(),
            report: staged.report.clone(),
        };
        write_json(&staged.job_file, &worker_job)?;
        Ok(staged)
    }
}

/// Run one staged job in a child process and turn whatever happened into an
/// [`Outcome`]. Faults the child reported were already logged by the child.
pub(crate) fn run_in_child(command: &WorkerCommand, unit_id: &str, staged: &StagedJob) -> Outcome {
    let started = Instant::now();
    debug!(unit = unit_id, job = %staged.job_file.display(), "starting worker process");
    let status = command.command(&staged.job_file).status();
    let elapsed = started.elapsed();

    let result = match status {
        Err(e) => Err(parent_fault(JobFault::Execution {
            unit_id: unit_id.to_string(),
            detail: format!("failed to start worker process: {}", e),
        })),
        Ok(status) if !status.success() => Err(parent_fault(JobFault::Execution {
            unit_id: unit_id.to_string(),
            detail: describe_exit(status),
        })),
        Ok(_) => match read_json::<WorkerReport>(&staged.report) {
            Ok(WorkerReport::Done { artifact }) => Ok(artifact),
            Ok(WorkerReport::Failed { fault }) => Err(fault),
            Err(e) => {
                debug!(unit = unit_id, "no usable report: {:#}", e);
                Err(parent_fault(JobFault::Lost {
                    unit_id: unit_id.to_string(),
                }))
            }
        },
    };

    Outcome {
        unit_id: unit_id.to_string(),
        elapsed,
        result,
    }
}

fn parent_fault(fault: JobFault) -> JobFault {
    warn!("{}", fault);
    fault
}

fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("worker process exited with status {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("worker process killed by signal {}", signal);
        }
    }
    "worker process terminated abnormally".to_string()
}

/// Body of a worker process: load the job in `job_file`, run it through
/// [`isolation::execute`] and write the report the parent waits for.
///
/// An `Err` means no report could be written; the caller should exit with
/// a failure status.
pub fn run_worker(registry: &UnitRegistry, job_file: &Path) -> anyhow::Result<Outcome> {
    let job: WorkerJob = read_json(job_file)?;
    let params: ParamBundle = read_json(&job.params)?;
    worker::init_worker(0, params.debug());
    let dataset: Dataset = read_json(&job.dataset)?;

    let descriptor = JobDescriptor {
        unit_id: job.unit_id,
        dataset: Arc::new(dataset),
        params: Arc::new(params),
        output_prefix: job.output_prefix,
    };
    let outcome = isolation::execute(registry, &descriptor);

    let report = match &outcome.result {
        Ok(artifact) => WorkerReport::Done {
            artifact: artifact.clone(),
        },
        Err(fault) => WorkerReport::Failed {
            fault: fault.clone(),
        },
    };
    write_json(&job.report, &report)?;
    Ok(outcome)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_vec(value).context("failed to serialize worker input")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&body).with_context(|| format!("malformed {}", path.display()))
}
