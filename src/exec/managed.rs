// src/exec/managed.rs

//! A launched, long-lived child process.
//!
//! `ManagedProcess` owns the child, its stdin, the channel of stdout lines
//! produced by its reader task, and the captured stderr. Pattern waits
//! consume that channel strictly forward: a line is looked at by exactly one
//! wait, and every wait resumes where the previous one stopped.

use std::future::{Future, pending};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::anyhow;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{Dispatch, debug, error, info, warn};

use crate::errors::{ProcscriptError, Result};
use crate::exec::reader::{OutputCapture, spawn_stdout_reader};
use crate::script::LaunchCommand;
use crate::types::Stream;

/// QEMU monitor escape `Ctrl-A x`: asks `-nographic` QEMU to quit.
pub const QEMU_QUIT_SEQUENCE: &[u8] = b"\x01x";

/// How long to keep reading a pipe after the child itself has exited.
///
/// Output written just before exit is still in flight to the reader task
/// when the exit is observed.
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct ManagedProcess {
    name: String,
    command: LaunchCommand,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: mpsc::UnboundedReceiver<String>,
    stderr: OutputCapture,
    exit_status: Option<ExitStatus>,
}

impl ManagedProcess {
    /// Spawn `command` directly (no shell) with all three stdio streams piped.
    ///
    /// Reader tasks for stdout and stderr start immediately and log under
    /// `log`. Must be called from within a Tokio runtime.
    pub fn start(name: &str, command: &LaunchCommand, log: &Dispatch) -> Result<Self> {
        info!(process = %name, "launching '{command}'");

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcscriptError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout of '{name}' was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr of '{name}' was not captured"))?;

        debug!(process = %name, pid = ?child.id(), "process started");

        Ok(Self {
            name: name.to_string(),
            command: command.clone(),
            stdout: spawn_stdout_reader(name.to_string(), stdout, log),
            stderr: OutputCapture::spawn(name.to_string(), Stream::Stderr, stderr, log),
            child,
            stdin,
            exit_status: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &LaunchCommand {
        &self.command
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Ask the OS whether the child is still alive.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Block until a stdout line matches `regex` (search, not full match).
    ///
    /// There is no timeout: a child that neither prints the pattern nor
    /// exits keeps this waiting forever.
    pub async fn wait_for_pattern(&mut self, regex: &Regex) -> Result<String> {
        self.wait_for_pattern_until(regex, pending()).await
    }

    /// Like [`wait_for_pattern`](Self::wait_for_pattern), failing with
    /// `Timeout` once `after` has elapsed.
    pub async fn wait_for_pattern_timeout(
        &mut self,
        regex: &Regex,
        after: Duration,
    ) -> Result<String> {
        let name = self.name.clone();
        let pattern = regex.as_str().to_string();
        let deadline = async move {
            sleep(after).await;
            ProcscriptError::Timeout {
                name,
                pattern,
                after,
            }
        };
        self.wait_for_pattern_until(regex, deadline).await
    }

    /// The wait loop shared by every wait flavour.
    ///
    /// `cancel` aborts the wait with the error it resolves to. It is polled
    /// before each read, so a child that prints without pause cannot hold it
    /// off. When it fires, lines already sitting in the channel are still
    /// tried. Returns the matching line.
    pub async fn wait_for_pattern_until<C>(&mut self, regex: &Regex, cancel: C) -> Result<String>
    where
        C: Future<Output = ProcscriptError>,
    {
        tokio::pin!(cancel);

        loop {
            let next = tokio::select! {
                biased;
                err = &mut cancel => {
                    if let Some(line) = self.match_buffered(regex) {
                        return Ok(line);
                    }
                    warn!(process = %self.name, pattern = %regex, "stopped waiting: {err}");
                    return Err(err);
                }
                line = self.next_stdout_line() => line,
            };

            match next {
                Some(line) => {
                    if regex.is_match(&line) {
                        self.log_reached(regex);
                        return Ok(line);
                    }
                }
                None => {
                    // Stdout is closed; only the OS can say whether the child is gone.
                    if self.exit_status.is_none() {
                        tokio::select! {
                            err = &mut cancel => {
                                warn!(process = %self.name, pattern = %regex, "stopped waiting: {err}");
                                return Err(err);
                            }
                            status = self.child.wait() => {
                                let status = status?;
                                debug!(process = %self.name, %status, "process exited");
                                self.exit_status = Some(status);
                            }
                        }
                    }
                    return Err(self.ended_prematurely().await);
                }
            }
        }
    }

    /// Try the lines already received without waiting for more.
    fn match_buffered(&mut self, regex: &Regex) -> Option<String> {
        while let Ok(line) = self.stdout.try_recv() {
            if regex.is_match(&line) {
                self.log_reached(regex);
                return Some(line);
            }
        }
        None
    }

    fn log_reached(&self, regex: &Regex) {
        info!(
            process = %self.name,
            pattern = %regex,
            "reached '{}' in '{}'",
            regex,
            self.name
        );
    }

    /// Next stdout line, or `None` once the child has ended and its output
    /// is drained.
    async fn next_stdout_line(&mut self) -> Option<String> {
        loop {
            if self.exit_status.is_some() {
                return timeout(EXIT_DRAIN_GRACE, self.stdout.recv())
                    .await
                    .ok()
                    .flatten();
            }

            tokio::select! {
                biased;
                line = self.stdout.recv() => return line,
                status = self.child.wait() => match status {
                    Ok(status) => {
                        debug!(process = %self.name, %status, "process exited");
                        self.exit_status = Some(status);
                    }
                    Err(e) => {
                        warn!(process = %self.name, error = %e, "failed to wait for process");
                        return None;
                    }
                },
            }
        }
    }

    /// Log what the child left behind and build the `PrematureExit` error.
    async fn ended_prematurely(&mut self) -> ProcscriptError {
        error!(process = %self.name, "'{}' ended prematurely", self.name);
        let stderr = self.stderr.drain(EXIT_DRAIN_GRACE).await;
        if !stderr.is_empty() {
            info!(process = %self.name, "stderr: {stderr:?}");
        }

        ProcscriptError::PrematureExit {
            name: self.name.clone(),
            status: self.exit_status,
        }
    }

    /// Kill the child. It must still be running: a test that stops a
    /// process expects it to be alive.
    ///
    /// Only sends the signal; the child is reaped in the background.
    pub fn stop(mut self) -> Result<()> {
        if let Some(status) = self.child.try_wait()? {
            error!(process = %self.name, %status, "'{}' ended prematurely", self.name);
            let stderr = self.stderr.snapshot();
            if !stderr.is_empty() {
                info!(process = %self.name, "stderr: {stderr:?}");
            }
            return Err(ProcscriptError::PrematureExit {
                name: self.name,
                status: Some(status),
            });
        }

        self.child.start_kill()?;
        info!(process = %self.name, "'{}' stopped", self.name);
        Ok(())
    }

    /// Write `sequence` to the child's stdin, close it, and wait for the
    /// child to exit on its own. No timeout.
    pub async fn stop_with_interrupt(mut self, sequence: &[u8]) -> Result<ExitStatus> {
        if let Some(mut stdin) = self.stdin.take() {
            let written = async {
                stdin.write_all(sequence).await?;
                stdin.flush().await
            }
            .await;
            if let Err(e) = written {
                warn!(process = %self.name, error = %e, "could not write interrupt sequence");
            }
        }

        let status = self.child.wait().await?;

        // Let the readers log whatever was still in flight.
        while let Ok(Some(_)) = timeout(EXIT_DRAIN_GRACE, self.stdout.recv()).await {}
        let stderr = self.stderr.drain(EXIT_DRAIN_GRACE).await;
        debug!(process = %self.name, stderr_bytes = stderr.len(), "stderr drained");

        info!(process = %self.name, %status, "'{}' exited after interrupt", self.name);
        Ok(status)
    }
}
