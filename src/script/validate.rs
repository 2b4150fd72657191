// src/script/validate.rs

use regex::Regex;
use tracing::warn;

use crate::errors::{ProcscriptError, Result};
use crate::script::duration::parse_duration;
use crate::script::model::{OneOrMany, RawLaunch, RawScript, RawStep};
use crate::script::step::{LaunchCommand, LaunchStep, RunStep, Script, Step, StopStep};

impl TryFrom<RawScript> for Script {
    type Error = ProcscriptError;

    fn try_from(raw: RawScript) -> std::result::Result<Self, Self::Error> {
        let steps = raw
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| decode_step(index, step))
            .collect::<Result<Vec<_>>>()?;
        Ok(Script::new_unchecked(steps))
    }
}

/// The single action key a step carries, taken out of its [`RawStep`].
enum Action {
    Command(String),
    Launch(RawLaunch),
    Stop(String),
    StopInterrupt(String),
}

/// Turn one raw step into a typed [`Step`], enforcing that exactly one
/// action key is present.
pub fn decode_step(index: usize, mut raw: RawStep) -> Result<Step> {
    let mut actions: Vec<(&str, Action)> = [
        raw.command.take().map(|c| ("command", Action::Command(c))),
        raw.launch.take().map(|l| ("launch", Action::Launch(l))),
        raw.stop.take().map(|t| ("stop", Action::Stop(t))),
        raw.stopqemu.take().map(|t| ("stopqemu", Action::StopInterrupt(t))),
    ]
    .into_iter()
    .flatten()
    .collect();

    match actions.pop() {
        None => Err(malformed(
            index,
            "step has no action; expected one of `command`, `launch`, `stop`, `stopqemu`",
        )),
        Some((_, action)) if actions.is_empty() => match action {
            Action::Command(command) => decode_command(index, command, raw),
            Action::Launch(launch) => decode_launch(index, launch, raw),
            Action::Stop(target) => decode_stop(index, target, false, raw),
            Action::StopInterrupt(target) => decode_stop(index, target, true, raw),
        },
        Some((last, _)) => {
            let mut keys: Vec<&str> = actions.iter().map(|(key, _)| *key).collect();
            keys.push(last);
            Err(malformed(
                index,
                format!("step has several actions ({}); expected exactly one", keys.join(", ")),
            ))
        }
    }
}

fn decode_command(index: usize, command: String, raw: RawStep) -> Result<Step> {
    if command.trim().is_empty() {
        return Err(malformed(index, "`command` is empty"));
    }
    warn_ignored(index, "command", &[("timeout", raw.timeout.is_some())]);
    Ok(Step::Run(RunStep {
        name: raw.name,
        command,
        expected_exit_code: raw.ret.unwrap_or(0),
        expected: compile_patterns(raw.expected)?,
        expected_stderr: compile_patterns(raw.expected_stderr)?,
        unexpected: compile_patterns(raw.unexpected)?,
    }))
}

fn decode_launch(index: usize, launch: RawLaunch, raw: RawStep) -> Result<Step> {
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| malformed(index, "`launch` step needs a `name`"))?;
    let command = match launch {
        RawLaunch::Line(line) => LaunchCommand::from_line(&line),
        RawLaunch::Argv(argv) => LaunchCommand::from_argv(argv),
    }
    .ok_or_else(|| malformed(index, format!("`launch` command of '{name}' is empty")))?;
    let timeout = raw
        .timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| malformed(index, format!("invalid `timeout`: {e}")))?;
    warn_ignored(
        index,
        "launch",
        &[
            ("ret", raw.ret.is_some()),
            ("expected_stderr", raw.expected_stderr.is_some()),
            ("unexpected", raw.unexpected.is_some()),
        ],
    );
    Ok(Step::Launch(LaunchStep {
        name,
        command,
        expected: compile_patterns(raw.expected)?,
        timeout,
    }))
}

fn decode_stop(index: usize, target: String, interrupt: bool, raw: RawStep) -> Result<Step> {
    if target.trim().is_empty() {
        return Err(malformed(index, "stop target name is empty"));
    }
    warn_ignored(
        index,
        if interrupt { "stopqemu" } else { "stop" },
        &[
            ("ret", raw.ret.is_some()),
            ("expected", raw.expected.is_some()),
            ("expected_stderr", raw.expected_stderr.is_some()),
            ("unexpected", raw.unexpected.is_some()),
            ("timeout", raw.timeout.is_some()),
        ],
    );
    let stop = StopStep { target };
    Ok(if interrupt {
        Step::StopInterrupt(stop)
    } else {
        Step::Stop(stop)
    })
}

fn compile_patterns(field: Option<OneOrMany>) -> Result<Vec<Regex>> {
    field
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|pattern| {
            Regex::new(&pattern).map_err(|source| ProcscriptError::InvalidPattern { pattern, source })
        })
        .collect()
}

fn warn_ignored(index: usize, kind: &str, fields: &[(&str, bool)]) {
    for (field, present) in fields {
        if *present {
            warn!(step = index, kind, field, "field does not apply to this step kind; ignoring");
        }
    }
}

fn malformed(index: usize, reason: impl Into<String>) -> ProcscriptError {
    ProcscriptError::MalformedStep {
        index,
        reason: reason.into(),
    }
}
