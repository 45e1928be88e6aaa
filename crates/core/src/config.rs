use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::params::{self, ParamBundle, ParamValue};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env_opt(key) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value: v,
            }),
    }
}

pub const ENV_TOP: &str = "TUNEGRAPH_TOP";
pub const ENV_WORKERS: &str = "TUNEGRAPH_WORKERS";

/// Run configuration, typically parsed from `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Default "top N" cutoff for ranking analyses.
    #[serde(default = "default_top")]
    pub top: i64,
    /// Worker pool size. 0 = available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub debug: bool,
    /// Run jobs on the pool threads instead of one child process per job.
    #[serde(default)]
    pub in_process: bool,
    /// Zone the time-based units show local times in (IANA name).
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Restrict the batch to these units. None = every discovered unit.
    #[serde(default)]
    pub units: Option<Vec<String>>,
    /// Units to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Unit name -> parameter overrides.
    #[serde(default)]
    pub overrides: BTreeMap<String, BTreeMap<String, ParamValue>>,
}

fn default_top() -> i64 {
    25
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top: default_top(),
            workers: 0,
            debug: false,
            in_process: false,
            time_zone: None,
            units: None,
            exclude: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Load config from `path`. A missing file yields defaults; a present
    /// but unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: PathBuf::from(path),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is valid YAML `null`; treat it as "no settings".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Apply `TUNEGRAPH_TOP` / `TUNEGRAPH_WORKERS` on top of file values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(top) = env_parse::<i64>(ENV_TOP)? {
            self.top = top;
        }
        if let Some(workers) = env_parse::<usize>(ENV_WORKERS)? {
            self.workers = workers;
        }
        Ok(())
    }

    /// Build the parameter bundle shared by every job in the batch.
    pub fn param_bundle(&self) -> ParamBundle {
        let mut bundle = ParamBundle::new()
            .with(params::TOP, self.top)
            .with(params::DEBUG, self.debug);
        if let Some(zone) = &self.time_zone {
            bundle.set(params::TIME_ZONE, zone.as_str());
        }
        for (unit, values) in &self.overrides {
            for (key, value) in values {
                bundle.set_override(unit, key, value.clone());
            }
        }
        bundle
    }

    /// Narrow `discovered` to the configured selection, preserving its order.
    ///
    /// Names listed in `units` that were not discovered are kept so the
    /// batch reports them as not found instead of dropping them silently.
    pub fn select_units(&self, discovered: &[String]) -> Vec<String> {
        let mut selected: Vec<String> = match &self.units {
            None => discovered.to_vec(),
            Some(wanted) => {
                let mut out: Vec<String> = discovered
                    .iter()
                    .filter(|d| wanted.contains(d))
                    .cloned()
                    .collect();
                for name in wanted {
                    if !out.contains(name) {
                        out.push(name.clone());
                    }
                }
                out
            }
        };
        selected.retain(|u| !self.exclude.contains(u));
        selected
    }

    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  top:       {}", self.top);
        if self.workers == 0 {
            tracing::info!("  workers:   auto");
        } else {
            tracing::info!("  workers:   {}", self.workers);
        }
        if self.in_process {
            tracing::info!("  isolation: in-process");
        }
        if let Some(zone) = &self.time_zone {
            tracing::info!("  time zone: {}", zone);
        }
        tracing::info!(
            "  units:     {}",
            self.units
                .as_ref()
                .map(|u| u.join(", "))
                .unwrap_or_else(|| "(all)".to_string())
        );
        if !self.exclude.is_empty() {
            tracing::info!("  exclude:   {}", self.exclude.join(", "));
        }
        if !self.overrides.is_empty() {
            tracing::info!("  overrides: {} unit(s)", self.overrides.len());
        }
    }
}
