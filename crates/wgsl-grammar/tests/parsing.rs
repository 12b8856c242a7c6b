//! The parser file tests.
//!
//! This test looks for directories in `tests/parsing`.
//!
//! Each directory is expected to contain:
//!
//! * `source.wgsl` - the test input source to parse.
//! * `source.tree` - the expected s-expression representation of the
//!   translation unit; empty if no translation unit was produced.
//! * `source.errors` - the expected diagnostics encountered during the parse,
//!   one `line:column: message` line per diagnostic.
//!
//! Sources that parse without diagnostics are additionally unparsed and
//! parsed again; the resulting tree must match the original.
//!
//! Both `source.tree` and `source.errors` may be automatically generated or
//! updated by setting the `BLESS` environment variable when running this test.

use std::env;
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::Config;
use codespan_reporting::term::termcolor::Buffer;
use libtest_mimic::Trial;
use pretty_assertions::StrComparison;
use wgsl_grammar::Diagnostic;
use wgsl_grammar::parse;
use wgsl_grammar::sexpr;
use wgsl_grammar::unparse;

/// Finds tests for this package.
fn find_tests() -> Vec<Trial> {
    let mut tests: Vec<_> = Path::new("tests")
        .join("parsing")
        .read_dir()
        .unwrap()
        .filter_map(|entry| {
            let entry = entry.expect("failed to read directory");
            let path = entry.path();
            if !path.is_dir() {
                return None;
            }

            let test_name = path
                .file_stem()
                .map(OsStr::to_string_lossy)
                .unwrap()
                .into_owned();
            Some(Trial::test(test_name, move || Ok(run_test(&path)?)))
        })
        .collect();

    tests.sort_by(|a, b| a.name().cmp(b.name()));
    tests
}

/// Normalizes a result.
fn normalize(s: &str) -> String {
    s.replace("\r\n", "\n")
}

/// Formats diagnostics as `line:column: message` lines.
fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut result = String::new();
    for diagnostic in diagnostics {
        let location = diagnostic
            .location()
            .map(|l| format!("{l}: "))
            .unwrap_or_default();
        writeln!(result, "{location}{message}", message = diagnostic.message())
            .expect("should write");
    }

    result
}

/// Renders diagnostics with `codespan-reporting`.
fn render_diagnostics(diagnostics: &[Diagnostic], path: &Path, source: &str) -> String {
    let file = SimpleFile::new(path.as_os_str().to_str().unwrap(), source);
    let mut buffer = Buffer::no_color();
    for diagnostic in diagnostics {
        term::emit_to_write_style(
            &mut buffer,
            &Config::default(),
            &file,
            &diagnostic.to_codespan(()),
        )
        .expect("should emit");
    }

    String::from_utf8(buffer.into_inner()).expect("should be UTF-8")
}

/// Compares a test result.
fn compare_result(path: &Path, result: &str) -> Result<(), anyhow::Error> {
    let result = normalize(result);
    if env::var_os("BLESS").is_some() {
        fs::write(path, &result).with_context(|| {
            format!(
                "failed to write result file `{path}`",
                path = path.display()
            )
        })?;
        return Ok(());
    }

    let expected = fs::read_to_string(path)
        .with_context(|| format!("failed to read result file `{path}`", path = path.display()))?
        .replace("\r\n", "\n");

    if expected != result {
        anyhow::bail!(
            "result from `{path}` is not as expected:\n{diff}",
            path = path.display(),
            diff = StrComparison::new(&expected, &result),
        );
    }

    Ok(())
}

/// Runs a test.
fn run_test(test: &Path) -> Result<(), anyhow::Error> {
    let path = test.join("source.wgsl");
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read source file `{path}`", path = path.display()))?
        .replace("\r\n", "\n");
    let (unit, diagnostics) = parse(&source);
    let tree = unit
        .as_ref()
        .map(sexpr::translation_unit)
        .unwrap_or_default();

    compare_result(&path.with_extension("tree"), &tree)?;
    compare_result(
        &path.with_extension("errors"),
        &format_diagnostics(&diagnostics),
    )?;

    // Every diagnostic must render with its message
    let rendered = render_diagnostics(&diagnostics, &path, &source);
    for diagnostic in &diagnostics {
        if !rendered.contains(diagnostic.message()) {
            anyhow::bail!(
                "rendered diagnostics do not contain `{message}`:\n{rendered}",
                message = diagnostic.message()
            );
        }
    }

    if let (Some(unit), true) = (&unit, diagnostics.is_empty()) {
        let text = unparse::to_source(unit);
        let (reparsed, diagnostics) = parse(&text);
        if !diagnostics.is_empty() {
            anyhow::bail!(
                "unparsed source has diagnostics:\n{text}\n{diagnostics}",
                diagnostics = format_diagnostics(&diagnostics)
            );
        }

        let reparsed = reparsed
            .as_ref()
            .map(sexpr::translation_unit)
            .unwrap_or_default();
        if reparsed != tree {
            anyhow::bail!(
                "unparsed source does not round-trip:\n{text}\n{diff}",
                diff = StrComparison::new(&tree, &reparsed),
            );
        }
    }

    Ok(())
}

fn main() {
    let args = libtest_mimic::Arguments::from_args();
    let tests = find_tests();
    libtest_mimic::run(&args, tests).exit();
}
