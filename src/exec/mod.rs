// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] runs `command` steps through the shell to completion.
//! - [`managed`] owns launched long-lived processes and their pattern waits.
//! - [`reader`] holds the background tasks that keep child pipes drained.

pub mod command;
pub mod managed;
pub mod reader;

pub use command::{CommandOutput, run_shell};
pub use managed::{ManagedProcess, QEMU_QUIT_SEQUENCE};
