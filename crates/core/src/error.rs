use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or reading a [`Dataset`](crate::Dataset).
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed library export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed library export: {0}")]
    Plist(#[from] plist::Error),

    #[error("Malformed library export: {0}")]
    Shape(String),

    #[error("Missing columns: {0:?}")]
    MissingColumns(Vec<String>),
}

/// Errors raised while loading the YAML run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}
