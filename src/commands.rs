//! Implementation of the `wgsl` CLI commands.

use std::path::Path;

use anyhow::Context as _;
use clap::Args;

use crate::config::CommonConfig;
use crate::diagnostics::Mode;

pub mod check;
pub mod dump;
pub mod tokens;

/// Arguments controlling how diagnostics are reported.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Disables color output.
    #[arg(long)]
    pub no_color: bool,

    /// The report mode.
    #[arg(short = 'm', long, value_name = "MODE")]
    pub report_mode: Option<Mode>,
}

impl ReportArgs {
    /// Applies the common configuration to the command line arguments.
    ///
    /// Arguments given on the command line take precedence.
    pub fn apply(mut self, config: &CommonConfig) -> Self {
        self.no_color = self.no_color || !config.color;
        if self.report_mode.is_none() {
            self.report_mode = Some(config.report_mode);
        }

        self
    }

    /// Gets the report mode to use.
    pub fn mode(&self) -> Mode {
        self.report_mode.unwrap_or_default()
    }
}

/// Reads a WGSL source file.
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file `{path}`", path = path.display()))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn arguments_take_precedence() {
        let config = CommonConfig {
            color: false,
            report_mode: Mode::OneLine,
        };

        let args = ReportArgs::default().apply(&config);
        assert!(args.no_color);
        assert_eq!(args.mode(), Mode::OneLine);

        let args = ReportArgs {
            no_color: false,
            report_mode: Some(Mode::Plain),
        }
        .apply(&CommonConfig::default());
        assert!(!args.no_color);
        assert_eq!(args.mode(), Mode::Plain);
    }
}
