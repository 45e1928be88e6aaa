mod cli;
mod config;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};

use tunegraph_compute::engine::run_worker;
use tunegraph_compute::telemetry::init_tracing;
use tunegraph_compute::{
    AnalysisEngine, DispatchConfig, EngineError, Isolation, WorkerCommand, builtin_registry,
};
use tunegraph_core::{load_dotenv, load_library};

use crate::cli::CliArgs;
use crate::config::{output_dir, resolve_config};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Some(job) = args.run_job.as_deref() {
        return run_job(job);
    }
    load_dotenv();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<ExitCode> {
    let config = resolve_config(&args);
    init_tracing(args.debug || config.as_ref().is_ok_and(|c| c.debug));
    let config = config?;

    let isolation = if config.in_process {
        Isolation::Thread
    } else {
        Isolation::Process(WorkerCommand::current_exe().context("failed to locate the worker executable")?)
    };
    let dispatch = DispatchConfig {
        workers: config.workers,
        debug: config.debug,
        isolation,
    };
    let engine = AnalysisEngine::with_builtin_units(&dispatch).context("failed to start analysis engine")?;

    if args.list {
        for unit in engine.discover() {
            println!("{}", unit);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(library) = args.library.as_deref() else {
        bail!("library path is required");
    };
    if config.top <= 0 {
        bail!("'--top' must be an integer greater than zero.");
    }
    if !library.is_file() {
        bail!(
            "library file {} does not exist; please provide a valid path",
            library.display()
        );
    }
    config.log_summary();

    let output = output_dir(library, args.output.as_deref());
    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;

    let dataset = load_library(library)
        .with_context(|| format!("failed to load library file {}", library.display()))?;
    if dataset.is_empty() {
        bail!("No tracks found in the library file.");
    }
    info!("Loaded {} tracks from {}", dataset.len(), library.display());

    let units = config.select_units(&engine.discover());
    let summary = match engine.run_batch(Arc::new(dataset), &units, config.param_bundle(), &output) {
        Ok(summary) => summary,
        Err(EngineError::EmptyDataset) => bail!("No tracks found in the library file."),
        Err(e) => return Err(e).context("batch aborted"),
    };
    summary.log();

    if summary.is_fatal() {
        error!("All {} analyses failed", summary.total());
        return Ok(ExitCode::FAILURE);
    }
    info!("Artifacts written to {}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// Worker process entry. Exits 0 once a report is written, whatever the
/// unit's own result; the parent reads the outcome from the report.
fn run_job(job: &Path) -> ExitCode {
    let outcome = builtin_registry()
        .map_err(anyhow::Error::from)
        .and_then(|registry| run_worker(&registry, job));
    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            init_tracing(false);
            error!("worker failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
