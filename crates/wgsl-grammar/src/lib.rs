//! A crate for lexing and parsing the WebGPU Shading Language (WGSL).
//!
//! Parsing proceeds in three passes over a single source string:
//!
//! 1. the [lexer] converts the source into tokens, reporting unknown
//!    characters, malformed numbers, and unterminated comments;
//! 2. [template list discovery](template) decides which `<` and `>` tokens
//!    delimit template lists and which are operators;
//! 3. a recursive descent parser builds the [abstract syntax tree](ast),
//!    recovering from syntax errors at declaration and statement
//!    boundaries.
//!
//! Every pass reports problems as [`Diagnostic`]s rather than failing, so a
//! single call to [`parse`] yields every diagnostic in a source.
//!
//! # Examples
//!
//! ```rust
//! use wgsl_grammar::parse;
//!
//! let (unit, diagnostics) = parse("@fragment fn main() -> @location(0) vec4f { return vec4f(1.0); }");
//! assert!(diagnostics.is_empty());
//!
//! let unit = unit.expect("should have a translation unit");
//! assert_eq!(unit.functions().count(), 1);
//! ```

use line_index::LineIndex;

pub mod ast;
mod diagnostic;
mod grammar;
pub mod lexer;
mod parser;
pub mod sexpr;
pub mod template;
pub mod unparse;

pub use ast::TranslationUnit;
pub use diagnostic::*;
pub use lexer::Lexeme;
pub use lexer::Token;
pub use lexer::TokenSet;
pub use lexer::tokenize;

/// Parses a WGSL translation unit from the given source.
///
/// Returns the translation unit along with every lex, disambiguation, and
/// syntax diagnostic, sorted by the position of their primary labels.
///
/// The translation unit is `None` only when diagnostics were reported and
/// nothing could be recovered from a source that was not blank.
pub fn parse(source: &str) -> (Option<TranslationUnit>, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = tokenize(source);
    let tokens: Vec<_> = tokens.into_iter().filter(|l| !l.token.is_trivia()).collect();
    let blank = tokens.is_empty();
    tracing::debug!(tokens = tokens.len(), "tokenized source");

    let (tokens, failure) = template::discover(source, tokens);
    let offset = failure.as_ref().and_then(Diagnostic::span).map(|s| s.start());
    diagnostics.extend(failure);

    let mut parser = parser::Parser::new(tokens, source.len());
    let unit = grammar::translation_unit(&mut parser, offset);
    diagnostics.extend(parser.finish());

    let index = LineIndex::new(source);
    for diagnostic in &mut diagnostics {
        diagnostic.locate(&index);
    }

    diagnostics.sort_by_key(|d| d.span().map(|s| (s.start(), s.end())));
    tracing::debug!(
        directives = unit.directives.len(),
        declarations = unit.declarations.len(),
        diagnostics = diagnostics.len(),
        "parsed translation unit"
    );

    if unit.is_empty() && !blank && !diagnostics.is_empty() {
        return (None, diagnostics);
    }

    (Some(unit), diagnostics)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn blank_source() {
        let (unit, diagnostics) = parse("  // nothing here\n/* at all */\n");
        assert!(diagnostics.is_empty());
        assert_eq!(unit, Some(TranslationUnit::default()));
    }

    #[test]
    fn nothing_recovered() {
        let (unit, diagnostics) = parse("}}}");
        assert_eq!(unit, None);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn diagnostics_are_sorted_and_located() {
        let (_, diagnostics) = parse("const a = 0x;\nvar impl: i32;\nconst b = $;");
        let locations: Vec<_> = diagnostics
            .iter()
            .map(|d| {
                let location = d.location().expect("should have a location");
                (location.line, location.column)
            })
            .collect();
        let mut sorted = locations.clone();
        sorted.sort();
        assert_eq!(locations, sorted);
        assert_eq!(locations.first(), Some(&(1, 11)));
    }

    #[test]
    fn literal_classification() {
        use crate::ast::Expression;
        use crate::ast::FloatSuffix;
        use crate::ast::GlobalDecl;
        use crate::ast::IntSuffix;
        use crate::ast::LiteralKind;
        use crate::ast::NumberBase;

        let (unit, diagnostics) =
            parse("const a = 0; const b = 0x1p3f; const c = 1.5e10f; const d = 0i; const e = 1u;");
        assert!(diagnostics.is_empty());
        let kinds: Vec<_> = unit
            .expect("should have a translation unit")
            .declarations
            .into_iter()
            .map(|d| match d {
                GlobalDecl::Const(d) => match d.initializer {
                    Expression::Literal(l) => l.kind,
                    e => panic!("expected a literal, found {e:?}"),
                },
                d => panic!("expected a constant, found {d:?}"),
            })
            .collect();

        assert_eq!(
            kinds,
            [
                LiteralKind::Int {
                    base: NumberBase::Decimal,
                    suffix: None
                },
                LiteralKind::Float {
                    base: NumberBase::Hex,
                    suffix: Some(FloatSuffix::F)
                },
                LiteralKind::Float {
                    base: NumberBase::Decimal,
                    suffix: Some(FloatSuffix::F)
                },
                LiteralKind::Int {
                    base: NumberBase::Decimal,
                    suffix: Some(IntSuffix::I)
                },
                LiteralKind::Int {
                    base: NumberBase::Decimal,
                    suffix: Some(IntSuffix::U)
                },
            ]
        );
    }
}
