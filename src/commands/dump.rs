//! Implementation of the `dump` subcommand.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use wgsl_grammar::TranslationUnit;
use wgsl_grammar::parse;
use wgsl_grammar::sexpr;
use wgsl_grammar::unparse;

use super::ReportArgs;
use super::read_source;
use crate::config::Config;
use crate::diagnostics::DiagnosticCounts;
use crate::diagnostics::emit_diagnostics;

/// Arguments for the `dump` subcommand.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct DumpArgs {
    /// The WGSL file to dump.
    #[clap(value_name = "PATH")]
    pub path: PathBuf,

    /// Prints the translation unit as normalized WGSL source rather than as
    /// an s-expression.
    #[arg(long)]
    pub source: bool,

    /// The diagnostic reporting arguments.
    #[command(flatten)]
    pub report: ReportArgs,
}

impl DumpArgs {
    /// Applies the configuration to the command line arguments.
    pub fn apply(mut self, config: &Config) -> Self {
        self.report = self.report.apply(&config.common);
        self
    }
}

/// Renders a translation unit in the requested form.
pub fn render(unit: &TranslationUnit, source: bool) -> String {
    if source {
        unparse::to_source(unit)
    } else {
        sexpr::translation_unit(unit)
    }
}

/// Performs the `dump` subcommand.
///
/// Whatever could be recovered is printed even when diagnostics are
/// reported.
pub fn dump(args: DumpArgs) -> Result<()> {
    let source = read_source(&args.path)?;
    let (unit, diagnostics) = parse(&source);

    if let Some(unit) = &unit {
        std::io::stdout()
            .lock()
            .write_all(render(unit, args.source).as_bytes())
            .context("failed to write to standard output")?;
    }

    emit_diagnostics(
        &args.path,
        &source,
        &diagnostics,
        args.report.mode(),
        args.report.no_color,
    )?;

    let mut counts = DiagnosticCounts::default();
    counts.add(&diagnostics);
    match counts.verify_no_diagnostics() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
