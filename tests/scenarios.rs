// tests/scenarios.rs
mod common;
use crate::common::{run_yaml, stop_all};

use procscript::engine::RunOutcome;
use procscript::errors::ProcscriptError;

fn failed_at(outcome: &RunOutcome) -> Option<usize> {
    match outcome {
        RunOutcome::Failed { step, .. } => Some(*step),
        _ => None,
    }
}

/// A launched process printing the expected text lets the run pass.
#[tokio::test]
async fn launch_waits_for_expected_line() {
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: echo hello
    name: p
    expected: hello
"#,
    )
    .await;

    assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
    assert_eq!(outcome.exit_code(), 0);
    stop_all(orchestrator);
}

/// `false` exits 1 while 0 is expected.
#[tokio::test]
async fn wrong_exit_code_fails_the_run() {
    let (outcome, _) = run_yaml(
        r#"
steps:
  - command: "false"
    ret: 0
"#,
    )
    .await;

    assert_eq!(outcome.exit_code(), 1);
    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::UnexpectedExitCode {
            expected: 0,
            actual: 1,
            ..
        })
    ));
}

/// "bar" never appears in the output of `echo foo`.
#[tokio::test]
async fn missing_pattern_fails_the_run() {
    let (outcome, _) = run_yaml(
        r#"
steps:
  - command: echo foo
    expected: bar
"#,
    )
    .await;

    assert_eq!(outcome.exit_code(), 1);
    match outcome.error() {
        Some(ProcscriptError::PatternNotFound { pattern, .. }) => assert_eq!(pattern, "bar"),
        other => panic!("expected PatternNotFound, got {other:?}"),
    }
}

/// The process exits before printing the pattern; the stop step never runs.
#[tokio::test]
async fn premature_exit_aborts_before_later_steps() {
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: sleep 0
    name: p
    expected: x
  - stop: p
"#,
    )
    .await;

    assert_eq!(failed_at(&outcome), Some(0));
    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::PrematureExit { name, .. }) if name == "p"
    ));
    // The stop step did not run, so the process is still registered.
    assert!(orchestrator.registry().contains("p"));
}

#[tokio::test]
async fn patterns_are_matched_in_declared_order() {
    let in_order = r#"
steps:
  - launch: [sh, -c, "echo first; echo second"]
    name: p
    expected: [first, second]
"#;
    let (outcome, orchestrator) = run_yaml(in_order).await;
    assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
    stop_all(orchestrator);

    let reversed = r#"
steps:
  - launch: [sh, -c, "echo first; echo second"]
    name: p
    expected: [second, first]
"#;
    let (outcome, _) = run_yaml(reversed).await;
    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::PrematureExit { .. })
    ));
}

#[tokio::test]
async fn a_line_is_never_matched_twice() {
    let (outcome, _) = run_yaml(
        r#"
steps:
  - launch: [sh, -c, "echo ready"]
    name: p
    expected: [ready, ready]
"#,
    )
    .await;

    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::PrematureExit { .. })
    ));
}

#[tokio::test]
async fn stopping_twice_fails_with_unknown_name() {
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: [sh, -c, "echo up; exec sleep 10"]
    name: p
    expected: up
  - stop: p
  - stop: p
"#,
    )
    .await;

    assert_eq!(failed_at(&outcome), Some(2));
    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::UnknownProcessName(name)) if name == "p"
    ));
    assert!(orchestrator.registry().is_empty());
}

#[tokio::test]
async fn duplicate_launch_keeps_the_first_process() {
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: [sh, -c, "echo up; exec sleep 10"]
    name: p
    expected: up
  - launch: [sh, -c, "echo second; exec sleep 10"]
    name: p
"#,
    )
    .await;

    assert_eq!(failed_at(&outcome), Some(1));
    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::DuplicateProcessName(name)) if name == "p"
    ));

    let mut orchestrator = orchestrator;
    let first = orchestrator
        .registry()
        .get("p")
        .expect("first process must stay registered");
    assert_eq!(first.command().args[1], "echo up; exec sleep 10");
    assert_eq!(orchestrator.is_running("p"), Some(true));
    stop_all(orchestrator);
}

#[tokio::test]
async fn failing_run_leaves_earlier_processes_running() {
    let (outcome, mut orchestrator) = run_yaml(
        r#"
steps:
  - launch: [sh, -c, "echo up; exec sleep 10"]
    name: server
    expected: up
  - launch: sleep 0
    name: client
    expected: connected
"#,
    )
    .await;

    assert_eq!(failed_at(&outcome), Some(1));
    assert_eq!(
        orchestrator.is_running("server"),
        Some(true),
        "engine must not stop survivors on abort"
    );
    stop_all(orchestrator);
}

#[tokio::test]
async fn stop_of_an_exited_process_is_premature_exit() {
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: "true"
    name: p
  - command: sleep 1
  - stop: p
"#,
    )
    .await;

    assert_eq!(failed_at(&outcome), Some(2));
    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::PrematureExit { status: Some(_), .. })
    ));
    assert!(orchestrator.registry().is_empty());
}

#[tokio::test]
async fn stopqemu_writes_the_escape_and_waits_for_exit() {
    // `cat` echoes the escape to stdout and exits once stdin is closed.
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: cat
    name: vm
  - stopqemu: vm
  - command: echo after
    expected: after
"#,
    )
    .await;

    assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
    assert!(orchestrator.registry().is_empty());
}

#[tokio::test]
async fn unknown_stopqemu_target_fails() {
    let (outcome, _) = run_yaml(
        r#"
steps:
  - stopqemu: vm
"#,
    )
    .await;

    assert!(matches!(
        outcome.error(),
        Some(ProcscriptError::UnknownProcessName(_))
    ));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let (outcome, orchestrator) = run_yaml(
        r#"
steps:
  - launch: /nonexistent/procscript-test-binary --flag
    name: p
"#,
    )
    .await;

    match outcome.error() {
        Some(ProcscriptError::Spawn { command, .. }) => {
            assert_eq!(command, "/nonexistent/procscript-test-binary --flag")
        }
        other => panic!("expected Spawn, got {other:?}"),
    }
    assert!(!orchestrator.registry().contains("p"));
}

/// Output produced while no step waits on the process must not stall it.
#[tokio::test]
async fn background_output_is_drained_between_steps() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("done");
    let marker = marker.display();

    let script = format!(
        r#"
steps:
  - launch: [sh, -c, "echo ready; seq 1 50000; touch {marker}; exec sleep 10"]
    name: chatty
    expected: ready
  - command: "for i in $(seq 1 50); do [ -f {marker} ] && exit 0; sleep 0.1; done; exit 1"
  - stop: chatty
"#
    );

    let (outcome, _) = run_yaml(&script).await;
    assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
}
