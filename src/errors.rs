// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every variant is fatal to a run: the orchestrator logs it with step
//! context and stops iterating.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::types::Stream;

#[derive(Error, Debug)]
pub enum ProcscriptError {
    #[error("Malformed step #{index}: {reason}")]
    MalformedStep { index: usize, reason: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process '{name}' ended prematurely ({})", describe_status(.status))]
    PrematureExit {
        name: String,
        status: Option<ExitStatus>,
    },

    #[error("Unexpected exit code {actual} from '{command}' (expected {expected})")]
    UnexpectedExitCode {
        command: String,
        expected: i32,
        actual: i32,
    },

    #[error("Pattern '{pattern}' not found in {stream}")]
    PatternNotFound { pattern: String, stream: Stream },

    #[error("Unexpected pattern '{pattern}' found in {stream}")]
    UnexpectedPatternFound { pattern: String, stream: Stream },

    #[error("A process named '{0}' is already running")]
    DuplicateProcessName(String),

    #[error("No process named '{0}' was launched")]
    UnknownProcessName(String),

    #[error("Timed out after {after:?} waiting for '{pattern}' from '{name}'")]
    Timeout {
        name: String,
        pattern: String,
        after: Duration,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_status(status: &Option<ExitStatus>) -> String {
    match status {
        Some(s) => s.to_string(),
        None => "exit status unknown".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ProcscriptError>;
