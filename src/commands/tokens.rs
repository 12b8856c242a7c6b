//! Implementation of the `tokens` subcommand.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use wgsl_grammar::Diagnostic;
use wgsl_grammar::Lexeme;
use wgsl_grammar::template;
use wgsl_grammar::tokenize;

use super::ReportArgs;
use super::read_source;
use crate::config::Config;
use crate::diagnostics::DiagnosticCounts;
use crate::diagnostics::emit_diagnostics;

/// Arguments for the `tokens` subcommand.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct TokensArgs {
    /// The WGSL file to tokenize.
    #[clap(value_name = "PATH")]
    pub path: PathBuf,

    /// Includes whitespace and comments in the output.
    #[arg(long)]
    pub trivia: bool,

    /// The diagnostic reporting arguments.
    #[command(flatten)]
    pub report: ReportArgs,
}

impl TokensArgs {
    /// Applies the configuration to the command line arguments.
    pub fn apply(mut self, config: &Config) -> Self {
        self.report = self.report.apply(&config.common);
        self
    }
}

/// Tokenizes a source and discovers its template lists.
///
/// Trivia is retained in source order when `trivia` is set.
pub fn classify(source: &str, trivia: bool) -> (Vec<Lexeme<'_>>, Vec<Diagnostic>) {
    let (lexemes, mut diagnostics) = tokenize(source);
    let (skipped, significant): (Vec<_>, Vec<_>) =
        lexemes.into_iter().partition(|l| l.token.is_trivia());

    let (mut lexemes, failure) = template::discover(source, significant);
    diagnostics.extend(failure);

    if trivia {
        lexemes.extend(skipped);
        lexemes.sort_by_key(|l| l.span.start());
    }

    (lexemes, diagnostics)
}

/// Formats a token as a `line:column  kind  text` line.
pub fn format_lexeme(lexeme: &Lexeme<'_>) -> String {
    format!(
        "{location:<8} {token:<20} {text:?}",
        location = lexeme.location.to_string(),
        token = format!("{token:?}", token = lexeme.token),
        text = lexeme.text
    )
}

/// Performs the `tokens` subcommand.
pub fn tokens(args: TokensArgs) -> Result<()> {
    let source = read_source(&args.path)?;
    let (lexemes, diagnostics) = classify(&source, args.trivia);

    let mut stdout = std::io::stdout().lock();
    for lexeme in &lexemes {
        writeln!(stdout, "{line}", line = format_lexeme(lexeme))
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

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use wgsl_grammar::Token;

    use super::*;

    #[test]
    fn templates_are_classified() {
        let (lexemes, diagnostics) = classify("var<private> a: array<i32, 2>;", false);
        assert!(diagnostics.is_empty());
        let tokens: Vec<_> = lexemes.iter().map(|l| l.token).collect();
        assert_eq!(
            tokens,
            [
                Token::VarKeyword,
                Token::TemplateArgsStart,
                Token::Ident,
                Token::TemplateArgsEnd,
                Token::Ident,
                Token::Colon,
                Token::Ident,
                Token::TemplateArgsStart,
                Token::Ident,
                Token::Comma,
                Token::DecimalIntLiteral,
                Token::TemplateArgsEnd,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn trivia_is_kept_in_order() {
        let (lexemes, _) = classify("a < b; // c", true);
        let texts: Vec<_> = lexemes.iter().map(|l| l.text).collect();
        assert_eq!(texts, ["a", " ", "<", " ", "b", ";", " ", "// c"]);
    }

    #[test]
    fn formatted_lines() {
        let (lexemes, _) = classify("\n  fn", false);
        assert_eq!(
            format_lexeme(&lexemes[0]),
            "2:3      FnKeyword            \"fn\""
        );
    }

    #[test]
    fn unresolved_templates_are_reported() {
        let (_, diagnostics) = classify("const a = b < c", false);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].location().map(|l| l.to_string()).as_deref(),
            Some("1:13")
        );
    }
}
