// src/engine/orchestrator.rs

use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, error, info, warn};

use crate::errors::{ProcscriptError, Result};
use crate::exec::{ManagedProcess, QEMU_QUIT_SEQUENCE, run_shell};
use crate::script::{LaunchStep, RunStep, Script, Step, StopStep};

use super::checks::check_run_output;
use super::registry::ProcessRegistry;
use super::{RunOptions, RunOutcome};

/// Executes a script step by step on a single control task.
///
/// Each step either finishes successfully and the next one starts, or fails
/// and the whole run stops there. Processes still registered when a run
/// fails are left running: tearing them down is up to whoever owns the
/// orchestrator (see [`Orchestrator::into_registry`]) or the environment.
pub struct Orchestrator {
    script: Script,
    options: RunOptions,
    registry: ProcessRegistry,
    log: Dispatch,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("steps", &self.script.len())
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// `log` receives every event of the run, including those of the
    /// per-process output readers.
    pub fn new(script: Script, options: RunOptions, log: Dispatch) -> Self {
        Self {
            script,
            options,
            registry: ProcessRegistry::new(),
            log,
        }
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Liveness of a registered process; see [`ProcessRegistry::is_running`].
    pub fn is_running(&mut self, name: &str) -> Option<bool> {
        self.registry.is_running(name)
    }

    /// Hand over the processes that are still registered.
    pub fn into_registry(self) -> ProcessRegistry {
        self.registry
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn execute(&mut self) -> RunOutcome {
        let log = self.log.clone();
        self.execute_steps().with_subscriber(log).await
    }

    async fn execute_steps(&mut self) -> RunOutcome {
        let steps = self.script.steps().to_vec();

        for (index, step) in steps.iter().enumerate() {
            info!(
                step = index,
                kind = step.kind(),
                "executing '{}'",
                step.label().unwrap_or("None")
            );

            if let Err(error) = self.execute_step(step).await {
                error!(
                    step = index,
                    kind = step.kind(),
                    name = step.label().unwrap_or("None"),
                    "step failed: {error}"
                );
                if !self.registry.is_empty() {
                    warn!(survivors = ?self.registry.names(), "processes left running");
                }
                return RunOutcome::Failed { step: index, error };
            }
        }

        info!(steps = steps.len(), "all steps passed");
        RunOutcome::Passed
    }

    /// Dispatch a single step by kind.
    pub async fn execute_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Run(run) => self.run_command_step(run).await,
            Step::Launch(launch) => self.launch_step(launch).await,
            Step::Stop(stop) => self.stop_step(stop),
            Step::StopInterrupt(stop) => self.stop_interrupt_step(stop).await,
        }
    }

    async fn run_command_step(&mut self, step: &RunStep) -> Result<()> {
        let output = run_shell(&step.command).await?;
        check_run_output(step, &output)
    }

    async fn launch_step(&mut self, step: &LaunchStep) -> Result<()> {
        if self.registry.contains(&step.name) {
            error!("A process with name '{}' is already running", step.name);
            return Err(ProcscriptError::DuplicateProcessName(step.name.clone()));
        }

        let wait_timeout = step.timeout.or(self.options.default_wait_timeout);

        info!("launching '{}'", step.name);
        let process = ManagedProcess::start(&step.name, &step.command, &self.log)?;
        let process = self.registry.insert(step.name.clone(), process)?;
        debug!(process = %step.name, pid = ?process.pid(), "registered");

        for pattern in &step.expected {
            match wait_timeout {
                Some(after) => process.wait_for_pattern_timeout(pattern, after).await?,
                None => process.wait_for_pattern(pattern).await?,
            };
        }

        Ok(())
    }

    fn stop_step(&mut self, step: &StopStep) -> Result<()> {
        let process = self.take_process(&step.target)?;
        info!("stopping '{}'", step.target);
        process.stop()
    }

    async fn stop_interrupt_step(&mut self, step: &StopStep) -> Result<()> {
        let process = self.take_process(&step.target)?;
        info!("stopping QEMU '{}'", step.target);
        process.stop_with_interrupt(QEMU_QUIT_SEQUENCE).await?;
        Ok(())
    }

    fn take_process(&mut self, name: &str) -> Result<ManagedProcess> {
        self.registry.remove(name).inspect_err(|_| {
            error!("A process with name '{name}' not launched");
        })
    }
}
