//! Grammar functions for expressions.
//!
//! WGSL does not define a precedence between the logical, bitwise, and
//! relational operator families. The top of the hierarchy therefore accepts
//! exactly one of:
//!
//! * a relational expression (a single optional comparison of two shift
//!   expressions),
//! * a chain of `&&` or a chain of `||` over relational expressions,
//! * a chain of a single bitwise operator over unary expressions.
//!
//! Below a relational expression, shift, additive, and multiplicative
//! expressions follow the usual precedence, with the additive and
//! multiplicative levels being left-associative.

use super::EXPRESSION_START_SET;
use super::close;
use super::ident;
use crate::Diagnostic;
use crate::ast::BinaryExpr;
use crate::ast::BinaryOperator;
use crate::ast::BitwiseOperator;
use crate::ast::CallExpr;
use crate::ast::ChainExpr;
use crate::ast::ChainOperator;
use crate::ast::Expression;
use crate::ast::IndexExpr;
use crate::ast::Literal;
use crate::ast::LiteralKind;
use crate::ast::LogicalOperator;
use crate::ast::MemberExpr;
use crate::ast::ParenExpr;
use crate::ast::RelationalExpr;
use crate::ast::RelationalOperator;
use crate::ast::TemplateElaboratedIdent;
use crate::ast::TemplateList;
use crate::ast::UnaryExpr;
use crate::ast::UnaryOperator;
use crate::lexer::Token;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::parser::reserved_word;

/// A function that parses an operand of an operator chain.
type Operand = fn(&mut Parser<'_>) -> Result<Expression, Diagnostic>;

/// Parses an expression.
pub(super) fn expression(parser: &mut Parser<'_>) -> Result<Expression, Diagnostic> {
    let first = unary(parser)?;

    let expr = match peek_operator::<BitwiseOperator>(parser) {
        Some(op) => Expression::Bitwise(chain(parser, first, op, unary)?),
        None => {
            let lhs = relational_from(parser, first)?;
            match peek_operator::<LogicalOperator>(parser) {
                Some(op) => Expression::Logical(chain(parser, lhs, op, relational)?),
                None => lhs,
            }
        }
    };

    // Any further binary operator would mix operator families
    if let Some((token, span)) = parser.peek()
        && is_binary_operator(token)
        && let Some(previous) = root_operator(&expr)
    {
        let found = operator_text(token);
        let message = if RelationalOperator::from_token(token).is_some()
            && matches!(expr, Expression::Relational(_))
        {
            "comparison operators cannot be chained without parentheses".to_string()
        } else if found == previous {
            format!("`{found}` operators cannot be chained without parentheses")
        } else {
            format!("`{found}` cannot be combined with `{previous}` without parentheses")
        };

        return Err(Diagnostic::error(message)
            .with_label("this operator requires parentheses", span)
            .with_label("in this expression", expr.span())
            .with_fix("add parentheses to make the grouping explicit"));
    }

    Ok(expr)
}

/// Peeks at the next token as a chain operator.
fn peek_operator<Op: ChainOperator>(parser: &Parser<'_>) -> Option<Op> {
    parser.peek().and_then(|(t, _)| Op::from_token(t))
}

/// Parses a chain of operands joined by the given operator.
///
/// The first operand has already been parsed.
fn chain<Op: ChainOperator + PartialEq>(
    parser: &mut Parser<'_>,
    first: Expression,
    op: Op,
    operand: Operand,
) -> Result<ChainExpr<Op>, Diagnostic> {
    let mut operands = vec![first];
    while peek_operator::<Op>(parser) == Some(op) {
        parser.next();
        operands.push(operand(parser)?);
    }

    let span = operands[0].span().cover(operands[operands.len() - 1].span());
    Ok(ChainExpr { op, operands, span })
}

/// Determines if the token is a binary operator of any family.
fn is_binary_operator(token: Token) -> bool {
    BinaryOperator::multiplicative(token).is_some()
        || BinaryOperator::additive(token).is_some()
        || BinaryOperator::shift(token).is_some()
        || RelationalOperator::from_token(token).is_some()
        || LogicalOperator::from_token(token).is_some()
        || BitwiseOperator::from_token(token).is_some()
}

/// Gets the source text of a binary operator token.
fn operator_text(token: Token) -> &'static str {
    // Descriptions of punctuation are the text surrounded by backticks
    token.describe().trim_matches('`')
}

/// Gets the operator at the root of the given expression.
fn root_operator(expr: &Expression) -> Option<&'static str> {
    match expr {
        Expression::Binary(e) => Some(e.op.as_str()),
        Expression::Relational(e) => Some(e.op.as_str()),
        Expression::Logical(e) => Some(e.op.as_str()),
        Expression::Bitwise(e) => Some(e.op.as_str()),
        _ => None,
    }
}

/// Parses a relational expression.
fn relational(parser: &mut Parser<'_>) -> Result<Expression, Diagnostic> {
    let first = unary(parser)?;
    relational_from(parser, first)
}

/// Parses a relational expression whose first unary operand has already
/// been parsed.
fn relational_from(parser: &mut Parser<'_>, first: Expression) -> Result<Expression, Diagnostic> {
    let lhs = shift_from(parser, first)?;
    let Some(op) = parser
        .peek()
        .and_then(|(t, _)| RelationalOperator::from_token(t))
    else {
        return Ok(lhs);
    };

    parser.next();
    let first = unary(parser)?;
    let rhs = shift_from(parser, first)?;
    Ok(Expression::Relational(RelationalExpr {
        op,
        span: lhs.span().cover(rhs.span()),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }))
}

/// Parses a shift expression whose first unary operand has already been
/// parsed.
///
/// A shift takes exactly two unary operands; otherwise this is an additive
/// expression.
fn shift_from(parser: &mut Parser<'_>, first: Expression) -> Result<Expression, Diagnostic> {
    match parser.peek().and_then(|(t, _)| BinaryOperator::shift(t)) {
        Some(op) => {
            parser.next();
            let rhs = unary(parser)?;
            Ok(binary(op, first, rhs))
        }
        None => additive_from(parser, first),
    }
}

/// Parses an additive expression whose first unary operand has already
/// been parsed.
fn additive_from(parser: &mut Parser<'_>, first: Expression) -> Result<Expression, Diagnostic> {
    let mut lhs = multiplicative_from(parser, first)?;
    while let Some(op) = parser.peek().and_then(|(t, _)| BinaryOperator::additive(t)) {
        parser.next();
        let first = unary(parser)?;
        let rhs = multiplicative_from(parser, first)?;
        lhs = binary(op, lhs, rhs);
    }

    Ok(lhs)
}

/// Parses a multiplicative expression whose first unary operand has already
/// been parsed.
fn multiplicative_from(
    parser: &mut Parser<'_>,
    first: Expression,
) -> Result<Expression, Diagnostic> {
    let mut lhs = first;
    while let Some(op) = parser
        .peek()
        .and_then(|(t, _)| BinaryOperator::multiplicative(t))
    {
        parser.next();
        let rhs = unary(parser)?;
        lhs = binary(op, lhs, rhs);
    }

    Ok(lhs)
}

/// Creates a binary expression node.
fn binary(op: BinaryOperator, lhs: Expression, rhs: Expression) -> Expression {
    Expression::Binary(BinaryExpr {
        op,
        span: lhs.span().cover(rhs.span()),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

/// Parses a unary expression.
fn unary(parser: &mut Parser<'_>) -> Result<Expression, Diagnostic> {
    match parser.peek() {
        Some((token, span)) => match UnaryOperator::from_token(token) {
            Some(op) => {
                parser.next();
                let operand = unary(parser)?;
                Ok(Expression::Unary(UnaryExpr {
                    op,
                    span: span.cover(operand.span()),
                    operand: Box::new(operand),
                }))
            }
            None => {
                let base = primary(parser)?;
                postfix(parser, base)
            }
        },
        None => {
            let (found, span) = parser.found();
            Err(expected_found("expression", found, span))
        }
    }
}

/// Parses a primary expression.
fn primary(parser: &mut Parser<'_>) -> Result<Expression, Diagnostic> {
    let Some(lexeme) = parser.peek_lexeme().copied() else {
        let (found, span) = parser.found();
        return Err(expected_found("expression", found, span));
    };

    if let Some(kind) = LiteralKind::classify(lexeme.token, lexeme.text) {
        parser.next();
        return Ok(Expression::Literal(Literal {
            kind,
            text: lexeme.text.to_string(),
            span: lexeme.span,
        }));
    }

    match lexeme.token {
        Token::Ident => {
            let callee = template_elaborated_ident(parser, "identifier")?;
            match parser.peek() {
                Some((Token::OpenParen, _)) => call(parser, callee).map(Expression::Call),
                _ => Ok(Expression::Ident(callee)),
            }
        }
        Token::OpenParen => {
            parser.next();
            let inner = expression(parser)?;
            let close = close(parser, Token::OpenParen, lexeme.span, Token::CloseParen)?;
            Ok(Expression::Paren(ParenExpr {
                inner: Box::new(inner),
                span: lexeme.span.cover(close),
            }))
        }
        Token::Reserved => Err(reserved_word(lexeme.text, lexeme.span)),
        _ => {
            let (found, span) = parser.found();
            Err(expected_found("expression", found, span))
        }
    }
}

/// Parses the argument list of a call whose callee has already been
/// parsed.
pub(super) fn call(
    parser: &mut Parser<'_>,
    callee: TemplateElaboratedIdent,
) -> Result<CallExpr, Diagnostic> {
    let (args, span) = parser.matching_delimited(
        Token::OpenParen,
        Token::CloseParen,
        Some(Token::Comma),
        EXPRESSION_START_SET,
        expression,
    )?;

    Ok(CallExpr {
        span: callee.span.cover(span),
        callee,
        args,
    })
}

/// Parses the index and member accesses following an expression.
pub(super) fn postfix(parser: &mut Parser<'_>, base: Expression) -> Result<Expression, Diagnostic> {
    let mut expr = base;
    loop {
        match parser.peek() {
            Some((Token::OpenBracket, open)) => {
                parser.next();
                let index = expression(parser)?;
                let close = close(parser, Token::OpenBracket, open, Token::CloseBracket)?;
                expr = Expression::Index(IndexExpr {
                    span: expr.span().cover(close),
                    base: Box::new(expr),
                    index: Box::new(index),
                });
            }
            Some((Token::Period, _)) => {
                parser.next();
                let member = ident(parser, "member name")?;
                expr = Expression::Member(MemberExpr {
                    span: expr.span().cover(member.span),
                    base: Box::new(expr),
                    member,
                });
            }
            _ => return Ok(expr),
        }
    }
}

/// Parses an identifier with an optional template list.
///
/// This is also the production for type specifiers.
pub(super) fn template_elaborated_ident(
    parser: &mut Parser<'_>,
    name: &str,
) -> Result<TemplateElaboratedIdent, Diagnostic> {
    let ident = ident(parser, name)?;
    let template = match parser.peek() {
        Some((Token::TemplateArgsStart, _)) => Some(template_list(parser)?),
        _ => None,
    };

    let span = match &template {
        Some(template) => ident.span.cover(template.span),
        None => ident.span,
    };

    Ok(TemplateElaboratedIdent {
        ident,
        template,
        span,
    })
}

/// Parses a template list.
pub(super) fn template_list(parser: &mut Parser<'_>) -> Result<TemplateList, Diagnostic> {
    let (args, span) = parser.matching_delimited(
        Token::TemplateArgsStart,
        Token::TemplateArgsEnd,
        Some(Token::Comma),
        EXPRESSION_START_SET,
        expression,
    )?;

    if args.is_empty() {
        return Err(
            Diagnostic::error("a template list must have at least one argument")
                .with_label("this template list is empty", span),
        );
    }

    Ok(TemplateList { args, span })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::ast::Expression;
    use crate::ast::GlobalDecl;
    use crate::parse;
    use crate::sexpr;

    /// Parses the initializer of `const x = <source>;`.
    fn parse_expr(source: &str) -> (Option<Expression>, Vec<String>) {
        let (unit, diagnostics) = parse(&format!("const x = {source};"));
        let expr = unit.and_then(|u| match u.declarations.into_iter().next() {
            Some(GlobalDecl::Const(d)) => Some(d.initializer),
            _ => None,
        });

        (
            expr,
            diagnostics.iter().map(|d| d.message().to_string()).collect(),
        )
    }

    /// Parses an expression and renders it as an s-expression.
    fn sexpr_of(source: &str) -> String {
        let (expr, diagnostics) = parse_expr(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        sexpr::expression(&expr.expect("should have an expression"))
    }

    #[test]
    fn precedence() {
        assert_eq!(sexpr_of("a + b * c"), "(+ a (* b c))");
        assert_eq!(sexpr_of("a - b - c"), "(- (- a b) c)");
        assert_eq!(sexpr_of("a << b"), "(<< a b)");
        assert_eq!(sexpr_of("a + b < c * d"), "(< (+ a b) (* c d))");
        assert_eq!(sexpr_of("-a.b[0]"), "(- (index (member a b) 0))");
    }

    #[test]
    fn chains() {
        assert_eq!(sexpr_of("a && b && c"), "(&& a b c)");
        assert_eq!(sexpr_of("a < b && c > d"), "(&& (< a b) (> c d))");
        assert_eq!(sexpr_of("(a < b) && (c > d)"), "(&& (paren (< a b)) (paren (> c d)))");
        assert_eq!(sexpr_of("a | b | c"), "(| a b c)");
        assert_eq!(sexpr_of("a & (b ^ c)"), "(& a (paren (^ b c)))");
    }

    #[test]
    fn templated_call() {
        assert_eq!(sexpr_of("a<b,c>(d)"), "(call (a (template b c)) d)");
        assert_eq!(sexpr_of("vec4<f32>(1.0)"), "(call (vec4 (template f32)) 1.0)");
        assert_eq!(sexpr_of("array<i32, 2>()"), "(call (array (template i32 2)))");
    }

    #[test]
    fn illegal_mixing() {
        let (expr, diagnostics) = parse_expr("a && b || c");
        assert!(expr.is_none());
        assert_eq!(
            diagnostics,
            ["`||` cannot be combined with `&&` without parentheses"]
        );

        let (_, diagnostics) = parse_expr("a & b && c");
        assert_eq!(
            diagnostics,
            ["`&&` cannot be combined with `&` without parentheses"]
        );

        let (_, diagnostics) = parse_expr("a == b == c");
        assert_eq!(
            diagnostics,
            ["comparison operators cannot be chained without parentheses"]
        );

        let (_, diagnostics) = parse_expr("a << b << c");
        assert_eq!(
            diagnostics,
            ["`<<` operators cannot be chained without parentheses"]
        );

        let (_, diagnostics) = parse_expr("a * b | c");
        assert_eq!(
            diagnostics,
            ["`|` cannot be combined with `*` without parentheses"]
        );
    }

    #[test]
    fn reserved_words_are_not_expressions() {
        let (_, diagnostics) = parse_expr("impl + 1");
        assert_eq!(
            diagnostics,
            ["`impl` is a reserved word and cannot be used as an identifier"]
        );
    }

    #[test]
    fn missing_operand() {
        let (_, diagnostics) = parse_expr("1 +");
        assert_eq!(diagnostics, ["expected expression, but found `;`"]);
    }
}
