use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a timetable input.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported input file '{}': expected .json, .yaml or .yml", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("malformed interval '{0}': expected 'start-end' or '(start, end)'")]
    InvalidInterval(String),

    #[error("interval '{0}' must end after it starts")]
    EmptyInterval(String),

    #[error("teacher '{teacher}' has a malformed time range constraint '{token}'")]
    InvalidTimeRange { teacher: String, token: String },

    #[error("day '{0}' is listed more than once")]
    DuplicateDay(String),

    #[error("interval '{0}' is listed more than once")]
    DuplicateInterval(String),

    #[error("the input declares no {0}")]
    EmptyAxis(&'static str),
}

/// Errors raised while loading a solver configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
