//! Utilities for reporting diagnostics to the terminal.

use std::io::IsTerminal as _;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context as _;
use anyhow::anyhow;
use clap::ValueEnum;
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::Config as TermConfig;
use codespan_reporting::term::DisplayStyle;
use codespan_reporting::term::emit_to_write_style;
use codespan_reporting::term::termcolor::ColorChoice;
use codespan_reporting::term::termcolor::StandardStream;
use serde::Deserialize;
use serde::Serialize;
use wgsl_grammar::Diagnostic;

/// Configuration for full display style.
static FULL_CONFIG: LazyLock<TermConfig> = LazyLock::new(|| TermConfig {
    display_style: DisplayStyle::Rich,
    ..Default::default()
});

/// Configuration for one-line display style.
static ONE_LINE_CONFIG: LazyLock<TermConfig> = LazyLock::new(|| TermConfig {
    display_style: DisplayStyle::Short,
    ..Default::default()
});

/// The diagnostic mode to use for reporting diagnostics.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Prints diagnostics as multiple lines.
    #[default]
    Full,

    /// Prints diagnostics as one line.
    OneLine,

    /// Prints diagnostics as uncolored `path:line:column: message` lines.
    Plain,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Full => write!(f, "full"),
            Mode::OneLine => write!(f, "one-line"),
            Mode::Plain => write!(f, "plain"),
        }
    }
}

/// A counter of the diagnostics reported by a command.
#[derive(Debug, Default)]
pub struct DiagnosticCounts {
    /// The number of files with diagnostics.
    pub files: usize,
    /// The number of diagnostics reported.
    pub diagnostics: usize,
}

impl DiagnosticCounts {
    /// Records the diagnostics of a single file.
    pub fn add(&mut self, diagnostics: &[Diagnostic]) {
        if !diagnostics.is_empty() {
            self.files += 1;
            self.diagnostics += diagnostics.len();
        }
    }

    /// Returns an error if any diagnostics were reported.
    pub fn verify_no_diagnostics(&self) -> Option<anyhow::Error> {
        if self.diagnostics == 0 {
            return None;
        }

        Some(anyhow!(
            "failing due to {count} diagnostic{s} in {files} file{fs}",
            count = self.diagnostics,
            s = if self.diagnostics == 1 { "" } else { "s" },
            files = self.files,
            fs = if self.files == 1 { "" } else { "s" },
        ))
    }
}

/// Formats a diagnostic as a `path:line:column: message` line.
///
/// Diagnostics without a location are formatted as `path: message`.
pub fn plain(path: &Path, diagnostic: &Diagnostic) -> String {
    match diagnostic.location() {
        Some(location) => format!(
            "{path}:{location}: {message}",
            path = path.display(),
            message = diagnostic.message()
        ),
        None => format!(
            "{path}: {message}",
            path = path.display(),
            message = diagnostic.message()
        ),
    }
}

/// Gets the color choice to use for standard error.
pub fn color_choice(no_color: bool) -> ColorChoice {
    if no_color || !std::io::stderr().is_terminal() {
        ColorChoice::Never
    } else {
        ColorChoice::Always
    }
}

/// Emits the diagnostics of a source file to standard error.
pub fn emit_diagnostics(
    path: &Path,
    source: &str,
    diagnostics: &[Diagnostic],
    mode: Mode,
    no_color: bool,
) -> anyhow::Result<()> {
    if mode == Mode::Plain {
        let mut stderr = std::io::stderr().lock();
        for diagnostic in diagnostics {
            writeln!(stderr, "{line}", line = plain(path, diagnostic))
                .context("failed to write diagnostics")?;
        }

        return Ok(());
    }

    let config = match mode {
        Mode::OneLine => &ONE_LINE_CONFIG,
        _ => &FULL_CONFIG,
    };

    let file = SimpleFile::new(path.display().to_string(), source);
    let mut stream = StandardStream::stderr(color_choice(no_color));
    for diagnostic in diagnostics {
        emit_to_write_style(&mut stream, config, &file, &diagnostic.to_codespan(()))
            .context("failed to emit diagnostic")?;
    }

    Ok(())
}
