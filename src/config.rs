//! Implementation of the configuration file.

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::Mode;

/// The name of the configuration file read from the working directory.
pub const CONFIG_FILE_NAME: &str = "wgsl.toml";

/// Represents the configuration for the `wgsl` command line tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields, default)]
pub struct Config {
    /// Common configuration options for all commands.
    pub common: CommonConfig,
    /// Configuration for the `check` command.
    pub check: CheckConfig,
}

/// Represents shared configuration options for all commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields, default)]
pub struct CommonConfig {
    /// Display color output.
    pub color: bool,
    /// The report mode.
    pub report_mode: Mode,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            color: true,
            report_mode: Mode::default(),
        }
    }
}

/// Represents the configuration for the `check` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields, default)]
pub struct CheckConfig {
    /// The maximum number of tokens a file may contain to be parsed.
    pub max_tokens: Option<usize>,
}

impl Config {
    /// Loads the configuration.
    ///
    /// If a path is given, the configuration is read from it and the file
    /// must exist. Otherwise, `wgsl.toml` is read from the current
    /// directory if present; if not, the default configuration is used.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read_config(path);
        }

        let path = Path::new(CONFIG_FILE_NAME);
        if path.is_file() {
            return Self::read_config(path);
        }

        debug!("no configuration file found; using the default configuration");
        Ok(Self::default())
    }

    /// Reads a configuration file from the specified path.
    pub fn read_config(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading configuration file");
        let text = std::fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read configuration file `{path}`",
                path = path.display()
            )
        })?;

        toml::from_str(&text).with_context(|| {
            format!(
                "failed to parse configuration file `{path}`",
                path = path.display()
            )
        })
    }
}
