#![allow(dead_code)]

use procscript::engine::{Orchestrator, RunOptions, RunOutcome};
use procscript::script::{Script, parse_and_validate};
use procscript::types::ScriptFormat;

pub use procscript_test_utils::{init_tracing, test_dispatch, with_timeout};

/// Parse and validate an in-memory YAML script.
pub fn yaml_script(yaml: &str) -> Script {
    parse_and_validate(yaml, ScriptFormat::Yaml).expect("test script must be valid")
}

/// Run `script` to completion (bounded by `with_timeout`) and hand back the
/// orchestrator so tests can inspect and clean up the registry.
pub async fn run_script(script: Script, options: RunOptions) -> (RunOutcome, Orchestrator) {
    let mut orchestrator = Orchestrator::new(script, options, test_dispatch());
    let outcome = with_timeout(orchestrator.execute()).await;
    (outcome, orchestrator)
}

pub async fn run_yaml(yaml: &str) -> (RunOutcome, Orchestrator) {
    run_script(yaml_script(yaml), RunOptions::default()).await
}

/// Kill whatever a test left registered.
pub fn stop_all(orchestrator: Orchestrator) {
    let mut registry = orchestrator.into_registry();
    for name in registry.names() {
        if let Ok(process) = registry.remove(&name) {
            let _ = process.stop();
        }
    }
}
