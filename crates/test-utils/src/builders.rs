#![allow(dead_code)]

use procscript::errors::Result;
use procscript::script::{OneOrMany, RawLaunch, RawScript, RawStep, Script};

/// Builder for `Script` to simplify test setup.
pub struct ScriptBuilder {
    script: RawScript,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            script: RawScript { steps: Vec::new() },
        }
    }

    pub fn step(mut self, step: RawStep) -> Self {
        self.script.steps.push(step);
        self
    }

    pub fn raw(self) -> RawScript {
        self.script
    }

    pub fn try_build(self) -> Result<Script> {
        Script::try_from(self.script)
    }

    pub fn build(self) -> Script {
        self.try_build()
            .expect("Failed to build valid script from builder")
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single `RawStep`.
pub struct StepBuilder {
    step: RawStep,
}

impl StepBuilder {
    /// `command: <cmd>` (run through the shell).
    pub fn command(cmd: &str) -> Self {
        Self::from_raw(RawStep {
            command: Some(cmd.to_string()),
            ..RawStep::default()
        })
    }

    /// `launch: <line>`, split on whitespace.
    pub fn launch(name: &str, line: &str) -> Self {
        Self::from_raw(RawStep {
            name: Some(name.to_string()),
            launch: Some(RawLaunch::Line(line.to_string())),
            ..RawStep::default()
        })
    }

    /// `launch: [program, args...]`.
    pub fn launch_argv(name: &str, argv: &[&str]) -> Self {
        Self::from_raw(RawStep {
            name: Some(name.to_string()),
            launch: Some(RawLaunch::Argv(argv.iter().map(|a| a.to_string()).collect())),
            ..RawStep::default()
        })
    }

    pub fn stop(target: &str) -> Self {
        Self::from_raw(RawStep {
            stop: Some(target.to_string()),
            ..RawStep::default()
        })
    }

    pub fn stopqemu(target: &str) -> Self {
        Self::from_raw(RawStep {
            stopqemu: Some(target.to_string()),
            ..RawStep::default()
        })
    }

    fn from_raw(step: RawStep) -> Self {
        Self { step }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.step.name = Some(name.to_string());
        self
    }

    pub fn ret(mut self, code: i32) -> Self {
        self.step.ret = Some(code);
        self
    }

    pub fn expected(mut self, pattern: &str) -> Self {
        push_pattern(&mut self.step.expected, pattern);
        self
    }

    pub fn expected_stderr(mut self, pattern: &str) -> Self {
        push_pattern(&mut self.step.expected_stderr, pattern);
        self
    }

    pub fn unexpected(mut self, pattern: &str) -> Self {
        push_pattern(&mut self.step.unexpected, pattern);
        self
    }

    pub fn timeout(mut self, duration: &str) -> Self {
        self.step.timeout = Some(duration.to_string());
        self
    }

    pub fn build(self) -> RawStep {
        self.step
    }
}

fn push_pattern(field: &mut Option<OneOrMany>, pattern: &str) {
    let mut patterns = field.take().map(OneOrMany::into_vec).unwrap_or_default();
    patterns.push(pattern.to_string());
    *field = Some(OneOrMany::Many(patterns));
}
