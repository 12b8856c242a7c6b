//! Implementation of the `check` subcommand.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use rayon::prelude::*;
use tracing::debug;
use tracing::info;
use walkdir::WalkDir;
use wgsl_grammar::Diagnostic;
use wgsl_grammar::parse;
use wgsl_grammar::tokenize;

use super::ReportArgs;
use super::read_source;
use crate::config::Config;
use crate::diagnostics::DiagnosticCounts;
use crate::diagnostics::emit_diagnostics;

/// The file extension of WGSL source files.
const WGSL_EXTENSION: &str = "wgsl";

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CheckArgs {
    /// The WGSL files or directories of WGSL files to check.
    #[clap(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// The maximum number of tokens a file may contain.
    ///
    /// Files with more tokens are reported and not parsed.
    #[arg(long, value_name = "COUNT")]
    pub max_tokens: Option<usize>,

    /// The diagnostic reporting arguments.
    #[command(flatten)]
    pub report: ReportArgs,
}

impl CheckArgs {
    /// Applies the configuration to the command line arguments.
    pub fn apply(mut self, config: &Config) -> Self {
        self.max_tokens = self.max_tokens.or(config.check.max_tokens);
        self.report = self.report.apply(&config.common);
        self
    }
}

/// Finds the WGSL files to check.
///
/// Files are returned as given; directories are searched recursively for
/// files with a `.wgsl` extension.
pub fn find_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry.with_context(|| {
                format!("failed to read directory `{path}`", path = path.display())
            })?;

            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(WGSL_EXTENSION)
            {
                found.push(entry.into_path());
            }
        }

        debug!(path = %path.display(), files = found.len(), "searched directory");
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

/// Checks a single source, returning its diagnostics.
///
/// A source with more than `max_tokens` tokens (trivia excluded) is not
/// parsed; a single diagnostic pointing at the first token over the limit
/// is returned instead.
pub fn check_source(source: &str, max_tokens: Option<usize>) -> Vec<Diagnostic> {
    if let Some(max) = max_tokens {
        let (lexemes, _) = tokenize(source);
        let significant: Vec<_> = lexemes.iter().filter(|l| !l.token.is_trivia()).collect();
        if let Some(first) = significant.get(max) {
            return vec![
                Diagnostic::error(format!(
                    "file contains {count} tokens, exceeding the maximum of {max}",
                    count = significant.len()
                ))
                .with_label("the token limit is exceeded here", first.span)
                .with_location(first.location),
            ];
        }
    }

    parse(source).1
}

/// The result of checking a single file.
#[derive(Debug)]
struct Checked {
    /// The path of the file.
    path: PathBuf,
    /// The source of the file.
    source: String,
    /// The diagnostics of the file.
    diagnostics: Vec<Diagnostic>,
}

/// Checks a single file.
fn check_file(path: &Path, max_tokens: Option<usize>) -> Result<Checked> {
    let source = read_source(path)?;
    let diagnostics = check_source(&source, max_tokens);
    debug!(
        path = %path.display(),
        diagnostics = diagnostics.len(),
        "checked file"
    );

    Ok(Checked {
        path: path.to_path_buf(),
        source,
        diagnostics,
    })
}

/// Performs the `check` subcommand.
pub fn check(args: CheckArgs) -> Result<()> {
    let files = find_files(&args.paths)?;
    info!(files = files.len(), "checking files");

    let results = files
        .par_iter()
        .map(|path| check_file(path, args.max_tokens))
        .collect::<Result<Vec<_>>>()?;

    let mut counts = DiagnosticCounts::default();
    for checked in &results {
        counts.add(&checked.diagnostics);
        emit_diagnostics(
            &checked.path,
            &checked.source,
            &checked.diagnostics,
            args.report.mode(),
            args.report.no_color,
        )?;
    }

    match counts.verify_no_diagnostics() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn token_limit() {
        let source = "const a = 1;\nconst b = 2;";
        assert!(check_source(source, Some(10)).is_empty());

        let diagnostics = check_source(source, Some(8));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "file contains 10 tokens, exceeding the maximum of 8"
        );
        assert_eq!(diagnostics[0].span().map(|s| s.start()), Some(23));
        assert_eq!(
            diagnostics[0].location().map(|l| l.to_string()).as_deref(),
            Some("2:11")
        );
    }

    #[test]
    fn finds_files_in_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.wgsl"), "fn b() {}").unwrap();
        std::fs::write(dir.path().join("nested").join("a.wgsl"), "fn a() {}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a shader").unwrap();

        let explicit = dir.path().join("notes.txt");
        let files = find_files(&[dir.path().to_path_buf(), explicit.clone()]).unwrap();
        assert_eq!(
            files,
            [
                dir.path().join("b.wgsl"),
                dir.path().join("nested").join("a.wgsl"),
                explicit,
            ]
        );
    }

    #[test]
    fn configuration_is_applied() {
        let mut config = Config::default();
        config.check.max_tokens = Some(5);

        let args = CheckArgs {
            paths: vec![PathBuf::from("a.wgsl")],
            max_tokens: None,
            report: ReportArgs::default(),
        }
        .apply(&config);
        assert_eq!(args.max_tokens, Some(5));

        let args = CheckArgs {
            paths: vec![PathBuf::from("a.wgsl")],
            max_tokens: Some(50),
            report: ReportArgs::default(),
        }
        .apply(&config);
        assert_eq!(args.max_tokens, Some(50));
    }
}
