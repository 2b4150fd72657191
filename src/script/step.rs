// src/script/step.rs

//! Validated, typed steps.
//!
//! A [`Script`] can only be obtained through `TryFrom<RawScript>`, so every
//! step it holds has exactly one action, compiled patterns and the fields
//! its action requires.

use std::fmt;
use std::time::Duration;

use regex::Regex;

/// A validated test script.
#[derive(Debug, Clone)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub(crate) fn new_unchecked(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One instruction of a script.
#[derive(Debug, Clone)]
pub enum Step {
    Run(RunStep),
    Launch(LaunchStep),
    Stop(StopStep),
    StopInterrupt(StopStep),
}

impl Step {
    /// Label used in logs: the step name, or the stop target.
    pub fn label(&self) -> Option<&str> {
        match self {
            Step::Run(s) => s.name.as_deref(),
            Step::Launch(s) => Some(&s.name),
            Step::Stop(s) | Step::StopInterrupt(s) => Some(&s.target),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Step::Run(_) => "command",
            Step::Launch(_) => "launch",
            Step::Stop(_) => "stop",
            Step::StopInterrupt(_) => "stopqemu",
        }
    }
}

/// `command`: run through the shell to completion, then check the output.
#[derive(Debug, Clone)]
pub struct RunStep {
    pub name: Option<String>,
    pub command: String,
    pub expected_exit_code: i32,
    pub expected: Vec<Regex>,
    pub expected_stderr: Vec<Regex>,
    pub unexpected: Vec<Regex>,
}

/// `launch`: start a long-lived process and wait for its output.
#[derive(Debug, Clone)]
pub struct LaunchStep {
    pub name: String,
    pub command: LaunchCommand,
    /// Matched in this order against successive stdout lines.
    pub expected: Vec<Regex>,
    pub timeout: Option<Duration>,
}

/// `stop` / `stopqemu`: the name of a launched process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopStep {
    pub target: String,
}

/// Program and arguments of a launched process. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace. Quoting is not interpreted; use
    /// the list form in the script when an argument contains spaces.
    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut parts = argv.into_iter();
        let program = parts.next().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
