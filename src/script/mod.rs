// src/script/mod.rs

//! Test script loading and validation.
//!
//! - [`model`] is the serde mapping of the script file (`RawScript`).
//! - [`loader`] reads TOML or YAML from disk.
//! - [`validate`] turns raw steps into typed [`Step`]s.
//! - [`step`] holds the typed steps the orchestrator executes.

pub mod duration;
pub mod loader;
pub mod model;
pub mod step;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_and_validate};
pub use model::{OneOrMany, RawLaunch, RawScript, RawStep};
pub use step::{LaunchCommand, LaunchStep, RunStep, Script, Step, StopStep};
