use proptest::prelude::*;
use regex::Regex;

use procscript::engine::checks::check_run_output;
use procscript::errors::ProcscriptError;
use procscript::exec::CommandOutput;
use procscript::script::RunStep;

fn literal(s: &str) -> Regex {
    Regex::new(&regex::escape(s)).unwrap()
}

fn run_step(expected: &[String], unexpected: &[String], ret: i32) -> RunStep {
    RunStep {
        name: None,
        command: "prop".to_string(),
        expected_exit_code: ret,
        expected: expected.iter().map(|s| literal(s)).collect(),
        expected_stderr: Vec::new(),
        unexpected: unexpected.iter().map(|s| literal(s)).collect(),
    }
}

// Lines are lowercase words; needles are uppercase so they can only be
// present when a test puts them there.
fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z ]{0,20}", 0..10)
}

fn needles_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Z]{3,8}", 1..4)
}

proptest! {
    /// Every expected pattern present somewhere in stdout → pass, regardless
    /// of where it sits among other lines.
    #[test]
    fn expected_patterns_found_anywhere_pass(
        lines in lines_strategy(),
        needles in needles_strategy(),
        positions in proptest::collection::vec(any::<usize>(), 4),
    ) {
        let mut out_lines = lines.clone();
        for (i, needle) in needles.iter().enumerate() {
            let at = positions[i % positions.len()] % (out_lines.len() + 1);
            out_lines.insert(at, format!("prefix {needle} suffix"));
        }
        let output = CommandOutput {
            exit_code: 0,
            stdout: out_lines.join("\n"),
            stderr: String::new(),
        };

        prop_assert!(check_run_output(&run_step(&needles, &[], 0), &output).is_ok());
    }

    /// A needle that was never printed is reported as not found, naming it.
    #[test]
    fn absent_expected_pattern_fails(
        lines in lines_strategy(),
        needles in needles_strategy(),
    ) {
        let output = CommandOutput {
            exit_code: 0,
            stdout: lines.join("\n"),
            stderr: String::new(),
        };

        match check_run_output(&run_step(&needles, &[], 0), &output) {
            Err(ProcscriptError::PatternNotFound { pattern, .. }) => {
                prop_assert_eq!(pattern, regex::escape(&needles[0]));
            }
            other => prop_assert!(false, "expected PatternNotFound, got {:?}", other),
        }
    }

    /// An unexpected needle on either stream fails; on neither stream passes.
    #[test]
    fn unexpected_patterns_checked_on_both_streams(
        lines in lines_strategy(),
        needle in "[A-Z]{3,8}",
        on_stderr in any::<bool>(),
        present in any::<bool>(),
    ) {
        let mut stdout = lines.join("\n");
        let mut stderr = String::new();
        if present {
            let target = if on_stderr { &mut stderr } else { &mut stdout };
            target.push_str(&format!("\n{needle}\n"));
        }
        let output = CommandOutput { exit_code: 0, stdout, stderr };

        let result = check_run_output(&run_step(&[], &[needle], 0), &output);
        prop_assert_eq!(result.is_ok(), !present);
    }

    /// Exit code mismatches win over every pattern check.
    #[test]
    fn exit_code_mismatch_is_reported_first(
        expected in -5i32..5,
        actual in -5i32..5,
        needles in needles_strategy(),
    ) {
        prop_assume!(expected != actual);
        let output = CommandOutput {
            exit_code: actual,
            stdout: String::new(),
            stderr: needles.join(" "),
        };

        let step = run_step(&needles, &needles, expected);
        let is_exit_code_error = matches!(
            check_run_output(&step, &output),
            Err(ProcscriptError::UnexpectedExitCode { .. })
        );
        prop_assert!(is_exit_code_error);
    }
}
