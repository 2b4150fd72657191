// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::script::duration::parse_duration;

/// Command-line arguments for `procscript`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procscript",
    version,
    about = "Run a scripted sequence of commands and long-lived processes, checking their output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the test script (YAML, or TOML with a `.toml` extension).
    #[arg(short = 'f', long, value_name = "PATH")]
    pub script: PathBuf,

    /// Also write the full debug log to this file.
    #[arg(short = 'l', long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Console logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCSCRIPT_LOG` or `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Give up on a launch step's pattern wait after this long (e.g. `90s`).
    ///
    /// A step's own `timeout` takes precedence. Without either, waits are
    /// unbounded.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub wait_timeout: Option<Duration>,

    /// Parse + validate the script and print its steps without running them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
