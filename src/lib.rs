// src/lib.rs

pub mod cli;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod script;
pub mod types;

use anyhow::{Context, Result};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, error, warn};

use crate::cli::CliArgs;
use crate::engine::{Orchestrator, RunOptions, RunOutcome};
use crate::script::{Script, Step, load_and_validate};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - script loading and validation
/// - the orchestrator and its run options
/// - Ctrl-C handling (an interrupted run counts as failed)
///
/// Setup failures (unreadable or invalid script) are returned as errors;
/// step failures are reported through the returned [`RunOutcome`].
pub async fn run(args: CliArgs, log: Dispatch) -> Result<RunOutcome> {
    let inner_log = log.clone();
    async move {
        let script = load_and_validate(&args.script)
            .with_context(|| format!("loading script '{}'", args.script.display()))
            .inspect_err(|e| error!("{e:#}"))?;

        if args.dry_run {
            print_dry_run(&script);
            return Ok(RunOutcome::Passed);
        }

        let options = RunOptions {
            default_wait_timeout: args.wait_timeout,
        };
        let mut orchestrator = Orchestrator::new(script, options, inner_log);

        let outcome = tokio::select! {
            outcome = orchestrator.execute() => outcome,
            () = ctrl_c() => {
                warn!("interrupted; remaining steps skipped");
                RunOutcome::Interrupted
            }
        };

        Ok(outcome)
    }
    .with_subscriber(log)
    .await
}

/// Resolves on Ctrl-C; never resolves if the signal cannot be watched.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Simple dry-run output: print every step and what it expects.
fn print_dry_run(script: &Script) {
    println!("procscript dry-run");
    println!("steps ({}):", script.len());

    for (index, step) in script.steps().iter().enumerate() {
        match step {
            Step::Run(run) => {
                println!("  {index}. command: {}", run.command);
                if let Some(ref name) = run.name {
                    println!("      name: {name}");
                }
                println!("      ret: {}", run.expected_exit_code);
                print_patterns("expected", &run.expected);
                print_patterns("expected_stderr", &run.expected_stderr);
                print_patterns("unexpected", &run.unexpected);
            }
            Step::Launch(launch) => {
                println!("  {index}. launch: {}", launch.command);
                println!("      name: {}", launch.name);
                print_patterns("expected", &launch.expected);
                if let Some(timeout) = launch.timeout {
                    println!("      timeout: {timeout:?}");
                }
            }
            Step::Stop(stop) => println!("  {index}. stop: {}", stop.target),
            Step::StopInterrupt(stop) => println!("  {index}. stopqemu: {}", stop.target),
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_patterns(label: &str, patterns: &[regex::Regex]) {
    if !patterns.is_empty() {
        let list: Vec<_> = patterns.iter().map(|re| re.as_str()).collect();
        println!("      {label}: {list:?}");
    }
}
