// src/script/model.rs

use serde::Deserialize;

/// Top-level script document as read from disk, before validation.
///
/// ```yaml
/// steps:
///   - launch: qemu-system-riscv64 -nographic -kernel fw.bin
///     name: qemu
///     expected: ["OpenSBI", "login:"]
///   - command: ping -c 1 10.0.2.15
///     expected: "1 received"
///   - stopqemu: qemu
/// ```
///
/// The same structure is accepted as TOML (`[[steps]]` tables).
#[derive(Debug, Clone, Deserialize)]
pub struct RawScript {
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

/// A single step exactly as written in the script.
///
/// Exactly one of `command`, `launch`, `stop`, `stopqemu` must be set; that
/// check happens in [`crate::script::validate`], not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStep {
    /// Step label; required for `launch`, where it is the registry key.
    #[serde(default)]
    pub name: Option<String>,

    /// Shell command run to completion.
    #[serde(default)]
    pub command: Option<String>,

    /// Long-lived program to start (no shell).
    #[serde(default)]
    pub launch: Option<RawLaunch>,

    /// Name of a launched process to kill.
    #[serde(default)]
    pub stop: Option<String>,

    /// Name of a launched process to stop by writing the QEMU quit sequence.
    #[serde(default)]
    pub stopqemu: Option<String>,

    /// Expected exit code of a `command` step; defaults to 0.
    #[serde(default)]
    pub ret: Option<i32>,

    /// Patterns that must appear on stdout.
    #[serde(default)]
    pub expected: Option<OneOrMany>,

    /// Patterns that must appear on stderr (`command` only).
    #[serde(default)]
    pub expected_stderr: Option<OneOrMany>,

    /// Patterns that must appear on neither stream (`command` only).
    #[serde(default)]
    pub unexpected: Option<OneOrMany>,

    /// Bound on each pattern wait of a `launch` step, e.g. `"30s"`.
    #[serde(default)]
    pub timeout: Option<String>,
}

/// A pattern field may be a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// `launch` accepts either a command line or an explicit argv list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawLaunch {
    Line(String),
    Argv(Vec<String>),
}
