use std::fmt;
use std::str::FromStr;

/// Which output stream of a process a pattern was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Script file format, picked from the file extension.
///
/// `.toml` files are read as TOML; everything else (`.yaml`, `.yml`, no
/// extension) is read as YAML, which is what existing test scripts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Toml,
    Yaml,
}

impl Default for ScriptFormat {
    fn default() -> Self {
        ScriptFormat::Yaml
    }
}

impl FromStr for ScriptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toml" => Ok(ScriptFormat::Toml),
            "yaml" | "yml" => Ok(ScriptFormat::Yaml),
            other => Err(format!(
                "invalid script format: {other} (expected \"toml\" or \"yaml\")"
            )),
        }
    }
}
