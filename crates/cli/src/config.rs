use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tunegraph_core::AnalysisConfig;

use crate::cli::CliArgs;

/// Layer CLI flags over env and file settings. Priority: flag > env > file > default.
pub fn resolve_config(args: &CliArgs) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    config.apply_env().context("invalid environment override")?;

    if let Some(top) = args.top {
        config.top = top;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if !args.only.is_empty() {
        config.units = Some(args.only.clone());
    }
    if args.time_zone.is_some() {
        config.time_zone = args.time_zone.clone();
    }
    config.debug |= args.debug;
    config.in_process |= args.in_process;
    Ok(config)
}

/// `--output` if given, otherwise the library path without its extension.
pub fn output_dir(library: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(dir) => dir.to_path_buf(),
        None => library.with_extension(""),
    }
}
