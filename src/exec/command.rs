// src/exec/command.rs

//! Run-to-completion shell commands for `command` steps.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{ProcscriptError, Result};

/// Exit code and full output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `-1` if the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Build a shell command appropriate for the platform.
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Run `command` through the shell and capture everything it prints.
///
/// Output is collected in full, not streamed; the step is checked only after
/// the process has exited.
pub async fn run_shell(command: &str) -> Result<CommandOutput> {
    info!("{command:?}");

    let output = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| ProcscriptError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let result = CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    info!("stdout: {:?}", result.stdout);
    info!("stderr: {:?}", result.stderr);
    debug!(exit_code = result.exit_code, "command finished");

    Ok(result)
}
