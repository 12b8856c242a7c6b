//! Module for the WGSL grammar functions.
//!
//! Each function parses a single production of the grammar and returns the
//! resulting AST node. Errors are returned as diagnostics; the list parsing
//! functions recover from them at declaration and statement boundaries.

use crate::Diagnostic;
use crate::Span;
use crate::ast::Attribute;
use crate::ast::Ident;
use crate::ast::TranslationUnit;
use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::parser::unmatched;

mod attribute;
mod declaration;
mod expression;
mod statement;

/// The recovery set for top-level.
const TOP_RECOVERY_SET: TokenSet = TokenSet::new(&[
    Token::Attr as u8,
    Token::AliasKeyword as u8,
    Token::ConstKeyword as u8,
    Token::ConstAssertKeyword as u8,
    Token::DiagnosticKeyword as u8,
    Token::EnableKeyword as u8,
    Token::FnKeyword as u8,
    Token::OverrideKeyword as u8,
    Token::RequiresKeyword as u8,
    Token::StructKeyword as u8,
    Token::VarKeyword as u8,
]);

/// The recovery set for statements.
const STATEMENT_RECOVERY_SET: TokenSet = TokenSet::new(&[
    Token::Semicolon as u8,
    Token::CloseBrace as u8,
    Token::BreakKeyword as u8,
    Token::ConstKeyword as u8,
    Token::ConstAssertKeyword as u8,
    Token::ContinueKeyword as u8,
    Token::ContinuingKeyword as u8,
    Token::DiscardKeyword as u8,
    Token::ForKeyword as u8,
    Token::IfKeyword as u8,
    Token::LetKeyword as u8,
    Token::LoopKeyword as u8,
    Token::ReturnKeyword as u8,
    Token::SwitchKeyword as u8,
    Token::VarKeyword as u8,
    Token::WhileKeyword as u8,
]);

/// The set of tokens that may start an expression.
const EXPRESSION_START_SET: TokenSet = TokenSet::new(&[
    Token::Ident as u8,
    Token::DecimalIntLiteral as u8,
    Token::HexIntLiteral as u8,
    Token::DecimalFloatLiteral as u8,
    Token::HexFloatLiteral as u8,
    Token::MalformedNumber as u8,
    Token::TrueKeyword as u8,
    Token::FalseKeyword as u8,
    Token::OpenParen as u8,
    Token::Minus as u8,
    Token::Bang as u8,
    Token::Tilde as u8,
    Token::Star as u8,
    Token::And as u8,
]);

/// Parses a translation unit.
///
/// The `failure` offset is the position of a `<` that template discovery
/// could not resolve; the declaration enclosing it is discarded along with
/// its diagnostics and parsing stops there.
pub fn translation_unit(parser: &mut Parser<'_>, failure: Option<usize>) -> TranslationUnit {
    parser.push_recovery_set(TOP_RECOVERY_SET);

    let mut unit = TranslationUnit::default();
    while let Some((token, start)) = parser.peek() {
        let position = parser.position();
        let diagnostics = parser.diagnostic_count();
        let directives = unit.directives.len();
        let declarations = unit.declarations.len();

        let result = match token {
            Token::DiagnosticKeyword | Token::EnableKeyword | Token::RequiresKeyword => {
                declaration::directive(parser).map(|directive| {
                    if !unit.declarations.is_empty() {
                        parser.diagnostic(
                            Diagnostic::error("directives must appear before any declarations")
                                .with_label("this directive follows a declaration", directive.span()),
                        );
                    }

                    unit.directives.push(directive);
                })
            }
            _ => declaration::global_decl(parser).map(|decl| unit.declarations.push(decl)),
        };

        if let Err(e) = result {
            parser.recover(e);
            parser.next_if(Token::Semicolon);
        }

        if let Some(offset) = failure
            && offset >= start.start()
            && (parser.peek().is_none() || offset < parser.span().start())
        {
            tracing::debug!(offset, "discarding declaration with an unresolved template list");
            unit.directives.truncate(directives);
            unit.declarations.truncate(declarations);
            parser.truncate_diagnostics(diagnostics);
            parser.skip_to_end();
            break;
        }

        if parser.position() == position {
            parser.next();
        }
    }

    parser.pop_recovery_set();
    unit
}

/// Parses an identifier.
///
/// The `name` describes the identifier in the diagnostic when one is not
/// present.
fn ident(parser: &mut Parser<'_>, name: &str) -> Result<Ident, Diagnostic> {
    let (text, span) = parser.expect_ident(name)?;
    Ok(Ident::new(text, span))
}

/// Expects the token closing a bracketed construct.
///
/// Returns an "unmatched" diagnostic if the token is not present.
fn close(parser: &mut Parser<'_>, open: Token, open_span: Span, close: Token) -> Result<Span, Diagnostic> {
    match parser.peek() {
        Some((t, span)) if t == close => {
            parser.next();
            Ok(span)
        }
        _ => {
            let (found, span) = parser.found();
            Err(unmatched(
                open.describe(),
                open_span,
                close.describe(),
                found.unwrap_or("end of input"),
                span,
            ))
        }
    }
}

/// Consumes the `;` terminating a declaration or statement.
///
/// A missing `;` is reported but the construct it terminates is kept. The
/// tokens up to the current recovery set are skipped along with a `;`
/// following them, so the next construct starts past the stray tokens.
fn terminator(parser: &mut Parser<'_>) {
    if parser.next_if(Token::Semicolon) {
        return;
    }

    let (found, span) = parser.found();
    let previous = parser.previous_span();
    parser.recover(expected_found("`;`", found, span).with_label(
        "consider adding a `;` after this",
        Span::new(previous.end().saturating_sub(1), 1),
    ));
    parser.next_if(Token::Semicolon);
}

/// Reports attributes that were given to a construct that cannot have them.
fn reject_attributes(parser: &mut Parser<'_>, attributes: &[Attribute], what: &str) {
    if let (Some(first), Some(last)) = (attributes.first(), attributes.last()) {
        parser.diagnostic(
            Diagnostic::error(format!("attributes are not allowed on {what}"))
                .with_label("these attributes are not allowed", first.span.cover(last.span)),
        );
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::ast::GlobalDecl;
    use crate::parse;

    #[test]
    fn directives_after_declarations() {
        let (unit, diagnostics) = parse("const a = 1;\nenable f16;");
        let unit = unit.unwrap();
        assert_eq!(unit.directives.len(), 1);
        assert_eq!(unit.declarations.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "directives must appear before any declarations"
        );
    }

    #[test]
    fn recovers_at_next_declaration() {
        let (unit, diagnostics) = parse("var impl : i32;\nfn main() {}");
        let unit = unit.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(unit.declarations.len(), 1);
        assert!(matches!(unit.declarations[0], GlobalDecl::Function(_)));
    }

    #[test]
    fn unresolved_template_discards_declaration() {
        let (unit, diagnostics) = parse("const a = 1;\nconst b = x < y");
        let unit = unit.unwrap();
        assert_eq!(unit.declarations.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].kind(),
            crate::DiagnosticKind::Disambiguation
        );
    }

    #[test]
    fn missing_terminator_skips_stray_tokens() {
        let (unit, diagnostics) = parse("fn f() { let x = a<b>=c; return; }");
        let unit = unit.unwrap();
        let body = &unit.functions().next().unwrap().body.statements;
        assert_eq!(body.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message(), "expected `;`, but found `=`");
        assert_eq!(
            diagnostics[0].location().map(|l| l.to_string()).as_deref(),
            Some("1:22")
        );
    }

    #[test]
    fn malformed_number_keeps_declaration() {
        let (unit, diagnostics) = parse("const a = 08;");
        let unit = unit.unwrap();
        assert_eq!(unit.declarations.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message(), "invalid numeric literal `08`");
        assert_eq!(diagnostics[0].kind(), crate::DiagnosticKind::Lex);
    }

    #[test]
    fn missing_terminator_keeps_declaration() {
        let (unit, diagnostics) = parse("const a = 1\nfn main() {}");
        let unit = unit.unwrap();
        assert_eq!(unit.declarations.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "expected `;`, but found `fn` keyword"
        );
    }
}
