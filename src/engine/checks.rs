// src/engine/checks.rs

//! Expectation checks for `command` steps.
//!
//! Pure functions over a finished command's output: no processes, no
//! channels. The order of checks is fixed and the first failure wins:
//! exit code, expected stdout patterns, expected stderr patterns, then
//! unexpected patterns (stdout before stderr).

use regex::Regex;
use tracing::error;

use crate::errors::{ProcscriptError, Result};
use crate::exec::CommandOutput;
use crate::script::RunStep;
use crate::types::Stream;

/// Check `output` against every expectation of `step`.
pub fn check_run_output(step: &RunStep, output: &CommandOutput) -> Result<()> {
    check_exit_code(&step.command, step.expected_exit_code, output.exit_code)?;
    check_all_found(&step.expected, &output.stdout, Stream::Stdout)?;
    check_all_found(&step.expected_stderr, &output.stderr, Stream::Stderr)?;
    check_none_found(&step.unexpected, output)?;
    Ok(())
}

pub fn check_exit_code(command: &str, expected: i32, actual: i32) -> Result<()> {
    if expected != actual {
        error!(expected, actual, "unexpected return code {actual}");
        return Err(ProcscriptError::UnexpectedExitCode {
            command: command.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Every pattern must be found somewhere in `text`.
pub fn check_all_found(patterns: &[Regex], text: &str, stream: Stream) -> Result<()> {
    match patterns.iter().find(|re| !re.is_match(text)) {
        Some(re) => {
            error!(%stream, "'{}' not found in {:?}", re, text);
            Err(ProcscriptError::PatternNotFound {
                pattern: re.as_str().to_string(),
                stream,
            })
        }
        None => Ok(()),
    }
}

/// No pattern may be found in stdout or in stderr.
pub fn check_none_found(patterns: &[Regex], output: &CommandOutput) -> Result<()> {
    for re in patterns {
        for (stream, text) in [
            (Stream::Stdout, &output.stdout),
            (Stream::Stderr, &output.stderr),
        ] {
            if re.is_match(text) {
                error!(%stream, "'{}' found in {:?}", re, text);
                return Err(ProcscriptError::UnexpectedPatternFound {
                    pattern: re.as_str().to_string(),
                    stream,
                });
            }
        }
    }
    Ok(())
}
