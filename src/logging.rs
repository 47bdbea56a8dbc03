use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("failed to initialize logger: {0}")]
    Init(String),
}

/// Installs the global subscriber when a log file is configured.
///
/// The terminal UI owns stdout and stderr while running, so events only ever go to a
/// file. Returns `Ok(false)` when logging is disabled.
pub fn init_logging(settings: &Settings) -> Result<bool, LoggerError> {
    match settings.log_file.as_deref() {
        Some(path) => {
            init_file_logger(path, &settings.log_level, settings.log_json)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn init_file_logger(path: &Path, level: &str, json: bool) -> Result<(), LoggerError> {
    let env_filter = EnvFilter::try_new(level).map_err(|e| LoggerError::Filter {
        directive: level.to_string(),
        reason: e.to_string(),
    })?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let writer = Mutex::new(file);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::Init(e.to_string()))
}
