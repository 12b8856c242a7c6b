//! Grammar functions for attributes and diagnostic controls.

use super::EXPRESSION_START_SET;
use super::expression::expression;
use crate::Diagnostic;
use crate::Span;
use crate::ast::Attribute;
use crate::ast::AttributeKind;
use crate::ast::DiagnosticControl;
use crate::ast::DiagnosticRuleName;
use crate::ast::DiagnosticSeverity;
use crate::ast::Expression;
use crate::ast::Ident;
use crate::lexer::Token;
use crate::parser::Parser;
use crate::parser::expected_found;

/// Parses zero or more attributes.
pub(super) fn attributes(parser: &mut Parser<'_>) -> Result<Vec<Attribute>, Diagnostic> {
    let mut attributes = Vec::new();
    while let Some((Token::Attr, _)) = parser.peek() {
        attributes.push(attribute(parser)?);
    }

    Ok(attributes)
}

/// Parses a single attribute.
///
/// The attribute is parsed generically as `@name` or `@name(args...)` and
/// then specialized by name. An attribute with the wrong arguments is
/// reported and kept as [`AttributeKind::Other`].
fn attribute(parser: &mut Parser<'_>) -> Result<Attribute, Diagnostic> {
    let start = parser.require(Token::Attr);

    // Keywords such as `const` and `diagnostic` are valid attribute names
    let name = match parser.peek_lexeme().copied() {
        Some(lexeme) if lexeme.token == Token::Ident || lexeme.token.is_keyword() => {
            parser.next();
            Ident::new(lexeme.text, lexeme.span)
        }
        _ => {
            let (found, span) = parser.found();
            return Err(expected_found("attribute name", found, span));
        }
    };

    let args = match parser.peek() {
        Some((Token::OpenParen, _)) => Some(parser.matching_delimited(
            Token::OpenParen,
            Token::CloseParen,
            Some(Token::Comma),
            EXPRESSION_START_SET,
            expression,
        )?),
        _ => None,
    };

    let span = parser.span_from(start);
    let kind = match specialize(&name, args.clone(), span) {
        Ok(kind) => kind,
        Err(e) => {
            parser.diagnostic(e);
            AttributeKind::Other {
                name,
                args: args.map(|(args, _)| args),
            }
        }
    };

    Ok(Attribute { kind, span })
}

/// Creates a diagnostic for an attribute given the wrong number of
/// arguments.
fn arity(name: &Ident, expected: &str, count: usize, span: Span) -> Diagnostic {
    let provided = if count == 1 {
        "1 was provided".to_string()
    } else {
        format!("{count} were provided")
    };

    Diagnostic::error(format!(
        "the `@{name}` attribute expects {expected}, but {provided}"
    ))
    .with_highlight(span)
}

/// Specializes a generically parsed attribute by its name.
fn specialize(
    name: &Ident,
    args: Option<(Vec<Expression>, Span)>,
    span: Span,
) -> Result<AttributeKind, Diagnostic> {
    let (args, args_span) = match args {
        Some((args, args_span)) => (args, Some(args_span)),
        None => (Vec::new(), None),
    };

    let single = |args: Vec<Expression>| {
        <[Expression; 1]>::try_from(args)
            .map(|[arg]| arg)
            .map_err(|args| arity(name, "1 argument", args.len(), span))
    };

    let none = |args: Vec<Expression>, kind: AttributeKind| {
        if args.is_empty() {
            Ok(kind)
        } else {
            Err(arity(name, "no arguments", args.len(), span))
        }
    };

    match name.as_str() {
        "align" => single(args).map(AttributeKind::Align),
        "binding" => single(args).map(AttributeKind::Binding),
        "blend_src" => single(args).map(AttributeKind::BlendSrc),
        "builtin" => single(args).map(AttributeKind::Builtin),
        "group" => single(args).map(AttributeKind::Group),
        "id" => single(args).map(AttributeKind::Id),
        "location" => single(args).map(AttributeKind::Location),
        "size" => single(args).map(AttributeKind::Size),
        "const" => none(args, AttributeKind::Const),
        "invariant" => none(args, AttributeKind::Invariant),
        "must_use" => none(args, AttributeKind::MustUse),
        "vertex" => none(args, AttributeKind::Vertex),
        "fragment" => none(args, AttributeKind::Fragment),
        "compute" => none(args, AttributeKind::Compute),
        "interpolate" => {
            let count = args.len();
            let mut args = args.into_iter();
            match (args.next(), args.next(), args.next()) {
                (Some(ty), sampling, None) => Ok(AttributeKind::Interpolate { ty, sampling }),
                _ => Err(arity(name, "1 or 2 arguments", count, span)),
            }
        }
        "workgroup_size" => {
            let count = args.len();
            let mut args = args.into_iter();
            match (args.next(), args.next(), args.next(), args.next()) {
                (Some(x), y, z, None) => Ok(AttributeKind::WorkgroupSize { x, y, z }),
                _ => Err(arity(name, "1 to 3 arguments", count, span)),
            }
        }
        "diagnostic" => {
            let count = args.len();
            match (<[Expression; 2]>::try_from(args), args_span) {
                (Ok(args), Some(args_span)) => {
                    control_from_args(args, args_span).map(AttributeKind::Diagnostic)
                }
                _ => Err(arity(name, "2 arguments", count, span)),
            }
        }
        _ => Ok(AttributeKind::Other {
            name: name.clone(),
            args: args_span.map(|_| args),
        }),
    }
}

/// Parses the parenthesized diagnostic control of a `diagnostic` directive.
pub(super) fn diagnostic_control(parser: &mut Parser<'_>) -> Result<DiagnosticControl, Diagnostic> {
    let (args, span) = parser.matching_delimited(
        Token::OpenParen,
        Token::CloseParen,
        Some(Token::Comma),
        EXPRESSION_START_SET,
        expression,
    )?;

    let count = args.len();
    let args = <[Expression; 2]>::try_from(args).map_err(|_| {
        Diagnostic::error(format!(
            "a diagnostic control expects a severity and a rule name, but {count} argument{s} \
             {verb} provided",
            s = if count == 1 { "" } else { "s" },
            verb = if count == 1 { "was" } else { "were" },
        ))
        .with_highlight(span)
    })?;

    control_from_args(args, span)
}

/// Creates a diagnostic for an invalid diagnostic rule name.
fn invalid_rule_name(span: Span) -> Diagnostic {
    Diagnostic::error("invalid diagnostic rule name").with_label(
        "expected an identifier or two identifiers joined by `.`",
        span,
    )
}

/// Converts the two arguments of a diagnostic control into the severity
/// and rule name.
fn control_from_args(
    [severity, rule]: [Expression; 2],
    span: Span,
) -> Result<DiagnosticControl, Diagnostic> {
    let severity = severity
        .as_ident()
        .and_then(|ident| DiagnosticSeverity::from_name(ident.as_str()))
        .ok_or_else(|| {
            Diagnostic::error("invalid diagnostic severity")
                .with_label(
                    "expected `error`, `warning`, `info`, or `off`",
                    severity.span(),
                )
        })?;

    let rule = match rule {
        Expression::Ident(e) if e.template.is_none() => DiagnosticRuleName {
            name: e.ident,
            member: None,
        },
        Expression::Member(e) => match *e.base {
            Expression::Ident(base) if base.template.is_none() => DiagnosticRuleName {
                name: base.ident,
                member: Some(e.member),
            },
            _ => return Err(invalid_rule_name(e.span)),
        },
        other => return Err(invalid_rule_name(other.span())),
    };

    Ok(DiagnosticControl {
        severity,
        rule,
        span,
    })
}
