// src/script/loader.rs

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::Result;
use crate::script::model::RawScript;
use crate::script::step::Script;
use crate::types::ScriptFormat;

/// Pick the script format from the file extension (YAML unless `.toml`).
pub fn format_for_path(path: &Path) -> ScriptFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

/// Deserialize script text without semantic validation.
pub fn parse_raw(contents: &str, format: ScriptFormat) -> Result<RawScript> {
    let script = match format {
        ScriptFormat::Toml => toml::from_str(contents)?,
        ScriptFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(script)
}

/// Read a script file and return the raw, unvalidated document.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawScript> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    info!(script = %path.display(), "loading script");
    debug!("script contents:\n{contents}");
    parse_raw(&contents, format_for_path(path))
}

/// Read, deserialize and validate a script file.
///
/// This is the entry point the binary uses; after it succeeds every step has
/// exactly one action and all of its patterns compile.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Script> {
    let raw = load_from_path(path)?;
    Script::try_from(raw)
}

/// Deserialize and validate script text held in memory.
pub fn parse_and_validate(contents: &str, format: ScriptFormat) -> Result<Script> {
    Script::try_from(parse_raw(contents, format)?)
}
