//! Grammar functions for statements.

use super::STATEMENT_RECOVERY_SET;
use super::attribute::attributes;
use super::close;
use super::declaration::const_assert;
use super::declaration::value_decl;
use super::declaration::variable_decl;
use super::expression::call;
use super::expression::expression;
use super::expression::postfix;
use super::expression::template_elaborated_ident;
use super::ident;
use super::reject_attributes;
use super::terminator;
use crate::Diagnostic;
use crate::Span;
use crate::ast::AssignmentOperator;
use crate::ast::AssignmentStatement;
use crate::ast::AssignmentTarget;
use crate::ast::Attribute;
use crate::ast::BreakIfStatement;
use crate::ast::CaseSelector;
use crate::ast::CompoundStatement;
use crate::ast::ContinuingStatement;
use crate::ast::ElseIfClause;
use crate::ast::Expression;
use crate::ast::ForStatement;
use crate::ast::IfStatement;
use crate::ast::LoopStatement;
use crate::ast::ParenExpr;
use crate::ast::ReturnStatement;
use crate::ast::Statement;
use crate::ast::SwitchClause;
use crate::ast::SwitchClauseKind;
use crate::ast::SwitchStatement;
use crate::ast::TemplateElaboratedIdent;
use crate::ast::UnaryExpr;
use crate::ast::UnaryOperator;
use crate::ast::UpdateStatement;
use crate::ast::WhileStatement;
use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::parser::Parser;
use crate::parser::expected_found;
use crate::parser::expected_one_of;
use crate::parser::reserved_word;

/// The recovery set for switch clauses.
const SWITCH_CLAUSE_RECOVERY_SET: TokenSet = TokenSet::new(&[
    Token::CaseKeyword as u8,
    Token::DefaultKeyword as u8,
    Token::CloseBrace as u8,
]);

/// The tokens that start a switch clause.
const SWITCH_CLAUSE_START: TokenSet =
    TokenSet::new(&[Token::CaseKeyword as u8, Token::DefaultKeyword as u8]);

/// The tokens that end a block of statements.
const BLOCK_END: TokenSet = TokenSet::new(&[Token::CloseBrace as u8]);

/// The tokens that end the statements of a loop body.
const LOOP_BODY_END: TokenSet =
    TokenSet::new(&[Token::CloseBrace as u8, Token::ContinuingKeyword as u8]);

/// Parses the attributes and compound statement forming a block.
pub(super) fn block(parser: &mut Parser<'_>) -> Result<CompoundStatement, Diagnostic> {
    let attributes = attributes(parser)?;
    compound_statement(parser, attributes)
}

/// Parses a compound statement whose attributes have already been parsed.
fn compound_statement(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
) -> Result<CompoundStatement, Diagnostic> {
    let open = parser.expect(Token::OpenBrace)?;
    let start = attributes.first().map(|a| a.span).unwrap_or(open);
    let statements = statements(parser, BLOCK_END, false);
    let close = parser.consume_close_token(Token::OpenBrace, open, Token::CloseBrace);
    Ok(CompoundStatement {
        attributes,
        statements,
        span: start.cover(close),
    })
}

/// Parses statements until a token in the `until` set or the end of input.
///
/// Statements that fail to parse are reported and skipped. A `break if`
/// statement is only permitted as the last statement when `break_if` is
/// `true`.
fn statements(parser: &mut Parser<'_>, until: TokenSet, break_if: bool) -> Vec<Statement> {
    parser.push_recovery_set(STATEMENT_RECOVERY_SET);

    let mut statements = Vec::new();
    while let Some((token, _)) = parser.peek() {
        if until.contains(token.into_raw()) {
            break;
        }

        let position = parser.position();
        match statement(parser) {
            Ok(statement) => statements.push(statement),
            Err(e) => {
                parser.recover(e);
                parser.next_if(Token::Semicolon);
            }
        }

        if parser.position() == position {
            parser.next();
        }
    }

    parser.pop_recovery_set();

    let last = statements.len().saturating_sub(1);
    for (i, statement) in statements.iter().enumerate() {
        if let Statement::BreakIf(s) = statement
            && (!break_if || i != last)
        {
            parser.diagnostic(
                Diagnostic::error(
                    "a `break if` statement must be the last statement of a `continuing` block",
                )
                .with_highlight(s.span),
            );
        }
    }

    statements
}

/// Parses a statement.
fn statement(parser: &mut Parser<'_>) -> Result<Statement, Diagnostic> {
    let start = parser.span();
    let attributes = attributes(parser)?;

    match parser.peek() {
        Some((Token::OpenBrace, _)) => {
            return compound_statement(parser, attributes).map(Statement::Compound);
        }
        Some((Token::IfKeyword, _)) => return if_statement(parser, attributes, start),
        Some((Token::SwitchKeyword, _)) => return switch_statement(parser, attributes, start),
        Some((Token::LoopKeyword, _)) => return loop_statement(parser, attributes, start),
        Some((Token::ForKeyword, _)) => return for_statement(parser, attributes, start),
        Some((Token::WhileKeyword, _)) => {
            parser.next();
            let condition = expression(parser)?;
            let body = block(parser)?;
            return Ok(Statement::While(WhileStatement {
                attributes,
                condition,
                body,
                span: parser.span_from(start),
            }));
        }
        _ => reject_attributes(parser, &attributes, "this statement"),
    }

    let statement = match parser.peek() {
        Some((Token::Semicolon, span)) => {
            parser.next();
            return Ok(Statement::Empty(span));
        }
        Some((Token::ReturnKeyword, span)) => {
            parser.next();
            let value = match parser.peek() {
                Some((Token::Semicolon | Token::CloseBrace, _)) | None => None,
                _ => Some(expression(parser)?),
            };

            Statement::Return(ReturnStatement {
                value,
                span: parser.span_from(span),
            })
        }
        Some((Token::BreakKeyword, span)) => {
            parser.next();
            if parser.next_if(Token::IfKeyword) {
                let condition = expression(parser)?;
                Statement::BreakIf(BreakIfStatement {
                    condition,
                    span: parser.span_from(span),
                })
            } else {
                Statement::Break(span)
            }
        }
        Some((Token::ContinueKeyword, span)) => {
            parser.next();
            Statement::Continue(span)
        }
        Some((Token::DiscardKeyword, span)) => {
            parser.next();
            Statement::Discard(span)
        }
        Some((Token::ConstAssertKeyword, _)) => Statement::ConstAssert(const_assert(parser)?),
        _ => for_init(parser)?,
    };

    terminator(parser);
    Ok(statement)
}

/// Parses a variable declaration, an assignment, an increment or decrement,
/// or a function call statement without its terminator.
fn for_init(parser: &mut Parser<'_>) -> Result<Statement, Diagnostic> {
    match parser.peek() {
        Some((Token::VarKeyword, _)) => variable_decl(parser).map(Statement::Var),
        Some((Token::LetKeyword, _)) => value_decl(parser, Token::LetKeyword).map(Statement::Let),
        Some((Token::ConstKeyword, _)) => {
            value_decl(parser, Token::ConstKeyword).map(Statement::Const)
        }
        _ => update_or_call(parser),
    }
}

/// Parses an assignment, an increment or decrement, or a function call
/// statement without its terminator.
fn update_or_call(parser: &mut Parser<'_>) -> Result<Statement, Diagnostic> {
    match parser.peek() {
        Some((Token::Underscore, span)) => {
            parser.next();
            parser.expect(Token::Assignment)?;
            let value = expression(parser)?;
            Ok(Statement::Assignment(AssignmentStatement {
                target: AssignmentTarget::Phony(span),
                op: AssignmentOperator::Assign,
                value,
                span: parser.span_from(span),
            }))
        }
        Some((Token::Ident, _)) => {
            let callee = template_elaborated_ident(parser, "identifier")?;
            if let Some((Token::OpenParen, _)) = parser.peek() {
                return call(parser, callee).map(Statement::Call);
            }

            let TemplateElaboratedIdent {
                ident,
                template: None,
                span,
            } = callee
            else {
                let (found, span) = parser.found();
                return Err(expected_found("`(`", found, span));
            };

            let target = postfix(
                parser,
                Expression::Ident(TemplateElaboratedIdent {
                    ident,
                    template: None,
                    span,
                }),
            )?;
            update(parser, target)
        }
        Some((Token::Star | Token::And | Token::OpenParen, _)) => {
            let target = lhs_expression(parser)?;
            update(parser, target)
        }
        _ => {
            let (found, span) = parser.found();
            Err(expected_found("statement", found, span))
        }
    }
}

/// Parses the left-hand side of an assignment.
fn lhs_expression(parser: &mut Parser<'_>) -> Result<Expression, Diagnostic> {
    match parser.peek_lexeme().copied() {
        Some(lexeme) if matches!(lexeme.token, Token::Star | Token::And) => {
            parser.next();
            let op = if lexeme.token == Token::Star {
                UnaryOperator::Indirection
            } else {
                UnaryOperator::AddressOf
            };

            let operand = lhs_expression(parser)?;
            Ok(Expression::Unary(UnaryExpr {
                op,
                span: lexeme.span.cover(operand.span()),
                operand: Box::new(operand),
            }))
        }
        Some(lexeme) if lexeme.token == Token::OpenParen => {
            parser.next();
            let inner = lhs_expression(parser)?;
            let close = close(parser, Token::OpenParen, lexeme.span, Token::CloseParen)?;
            let expr = Expression::Paren(ParenExpr {
                inner: Box::new(inner),
                span: lexeme.span.cover(close),
            });
            postfix(parser, expr)
        }
        Some(lexeme) if lexeme.token == Token::Ident => {
            let ident = ident(parser, "identifier")?;
            let expr = Expression::Ident(TemplateElaboratedIdent {
                span: ident.span,
                ident,
                template: None,
            });
            postfix(parser, expr)
        }
        Some(lexeme) if lexeme.token == Token::Reserved => {
            Err(reserved_word(lexeme.text, lexeme.span))
        }
        _ => {
            let (found, span) = parser.found();
            Err(expected_found("assignment target", found, span))
        }
    }
}

/// Parses the assignment, increment, or decrement following an assignment
/// target.
fn update(parser: &mut Parser<'_>, target: Expression) -> Result<Statement, Diagnostic> {
    let start = target.span();
    match parser.peek() {
        Some((Token::PlusPlus, _)) => {
            parser.next();
            Ok(Statement::Increment(UpdateStatement {
                target,
                span: parser.span_from(start),
            }))
        }
        Some((Token::MinusMinus, _)) => {
            parser.next();
            Ok(Statement::Decrement(UpdateStatement {
                target,
                span: parser.span_from(start),
            }))
        }
        next => {
            let Some(op) = next.and_then(|(t, _)| AssignmentOperator::from_token(t)) else {
                let (found, span) = parser.found();
                return Err(expected_one_of(
                    &["`=`", "compound assignment", "`++`", "`--`"],
                    found,
                    span,
                ));
            };

            parser.next();
            let value = expression(parser)?;
            Ok(Statement::Assignment(AssignmentStatement {
                target: AssignmentTarget::Expression(target),
                op,
                value,
                span: parser.span_from(start),
            }))
        }
    }
}

/// Parses an `if` statement.
fn if_statement(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<Statement, Diagnostic> {
    parser.require(Token::IfKeyword);
    let condition = expression(parser)?;
    let body = block(parser)?;

    let mut else_ifs = Vec::new();
    let mut else_body = None;
    while parser.next_if(Token::ElseKeyword) {
        match parser.peek() {
            Some((Token::IfKeyword, span)) => {
                parser.next();
                let condition = expression(parser)?;
                let body = block(parser)?;
                else_ifs.push(ElseIfClause {
                    condition,
                    body,
                    span: parser.span_from(span),
                });
            }
            _ => {
                else_body = Some(block(parser)?);
                break;
            }
        }
    }

    Ok(Statement::If(IfStatement {
        attributes,
        condition,
        body,
        else_ifs,
        else_body,
        span: parser.span_from(start),
    }))
}

/// Parses a `switch` statement.
fn switch_statement(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<Statement, Diagnostic> {
    parser.require(Token::SwitchKeyword);
    let selector = expression(parser)?;
    let body_attributes = super::attribute::attributes(parser)?;
    let open = parser.expect(Token::OpenBrace)?;

    parser.push_recovery_set(SWITCH_CLAUSE_RECOVERY_SET);
    let mut clauses = Vec::new();
    while let Some((token, _)) = parser.peek() {
        if token == Token::CloseBrace {
            break;
        }

        let position = parser.position();
        match switch_clause(parser) {
            Ok(clause) => clauses.push(clause),
            Err(e) => parser.recover(e),
        }

        if parser.position() == position {
            parser.next();
        }
    }
    parser.pop_recovery_set();

    let close = parser.consume_close_token(Token::OpenBrace, open, Token::CloseBrace);
    if clauses.is_empty() {
        parser.diagnostic(
            Diagnostic::error("a switch statement must have at least one clause")
                .with_label("this switch body is empty", open.cover(close)),
        );
    }

    Ok(Statement::Switch(SwitchStatement {
        attributes,
        selector,
        body_attributes,
        clauses,
        span: parser.span_from(start),
    }))
}

/// Parses a `case` or `default` clause of a switch statement.
fn switch_clause(parser: &mut Parser<'_>) -> Result<SwitchClause, Diagnostic> {
    let (token, start) = parser.expect_in(SWITCH_CLAUSE_START, &["`case`", "`default`"])?;
    let kind = if token == Token::CaseKeyword {
        SwitchClauseKind::Case(case_selectors(parser)?)
    } else {
        SwitchClauseKind::Default
    };

    parser.next_if(Token::Colon);
    let body = block(parser)?;
    Ok(SwitchClause {
        kind,
        body,
        span: parser.span_from(start),
    })
}

/// Parses the selectors of a `case` clause.
fn case_selectors(parser: &mut Parser<'_>) -> Result<Vec<CaseSelector>, Diagnostic> {
    let mut selectors = vec![case_selector(parser)?];
    while parser.next_if(Token::Comma) {
        if let Some((Token::Colon | Token::OpenBrace | Token::Attr, _)) = parser.peek() {
            break;
        }

        selectors.push(case_selector(parser)?);
    }

    Ok(selectors)
}

/// Parses a single case selector.
fn case_selector(parser: &mut Parser<'_>) -> Result<CaseSelector, Diagnostic> {
    match parser.peek() {
        Some((Token::DefaultKeyword, span)) => {
            parser.next();
            Ok(CaseSelector::Default(span))
        }
        _ => expression(parser).map(CaseSelector::Expression),
    }
}

/// Parses a `loop` statement.
fn loop_statement(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<Statement, Diagnostic> {
    parser.require(Token::LoopKeyword);
    let body_attributes = super::attribute::attributes(parser)?;
    let open = parser.expect(Token::OpenBrace)?;
    let body = statements(parser, LOOP_BODY_END, false);

    let continuing = match parser.peek() {
        Some((Token::ContinuingKeyword, span)) => {
            parser.next();
            let attributes = super::attribute::attributes(parser)?;
            let open = parser.expect(Token::OpenBrace)?;
            let statements = statements(parser, BLOCK_END, true);
            parser.consume_close_token(Token::OpenBrace, open, Token::CloseBrace);
            Some(ContinuingStatement {
                attributes,
                statements,
                span: parser.span_from(span),
            })
        }
        _ => None,
    };

    parser.consume_close_token(Token::OpenBrace, open, Token::CloseBrace);
    Ok(Statement::Loop(LoopStatement {
        attributes,
        body_attributes,
        statements: body,
        continuing,
        span: parser.span_from(start),
    }))
}

/// Parses a `for` statement.
fn for_statement(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<Statement, Diagnostic> {
    parser.require(Token::ForKeyword);
    let open = parser.expect(Token::OpenParen)?;

    let init = match parser.peek() {
        Some((Token::Semicolon, _)) => None,
        _ => Some(Box::new(for_init(parser)?)),
    };
    parser.expect(Token::Semicolon)?;

    let condition = match parser.peek() {
        Some((Token::Semicolon, _)) => None,
        _ => Some(expression(parser)?),
    };
    parser.expect(Token::Semicolon)?;

    let update = match parser.peek() {
        Some((Token::CloseParen, _)) => None,
        _ => Some(Box::new(update_or_call(parser)?)),
    };
    close(parser, Token::OpenParen, open, Token::CloseParen)?;

    let body = block(parser)?;
    Ok(Statement::For(ForStatement {
        attributes,
        init,
        condition,
        update,
        body,
        span: parser.span_from(start),
    }))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::ast::AssignmentTarget;
    use crate::ast::Statement;
    use crate::parse;

    /// Parses the statements of the body of `fn f() { <source> }`.
    fn parse_body(source: &str) -> (Vec<Statement>, Vec<String>) {
        let (unit, diagnostics) = parse(&format!("fn f() {{ {source} }}"));
        let statements = unit
            .and_then(|u| u.functions().next().map(|f| f.body.statements.clone()))
            .unwrap_or_default();
        (
            statements,
            diagnostics.iter().map(|d| d.message().to_string()).collect(),
        )
    }

    #[test]
    fn simple_statements() {
        let (statements, diagnostics) = parse_body(
            "var i: i32 = 0; let x = 1; const y = 2; i += 1; i++; i--; _ = f(); f(1, 2); \
             *p = 3; (*p).x = 4; a[0].b = 5; ; return;",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(matches!(statements[0], Statement::Var(_)));
        assert!(matches!(statements[1], Statement::Let(_)));
        assert!(matches!(statements[2], Statement::Const(_)));
        assert!(matches!(statements[3], Statement::Assignment(_)));
        assert!(matches!(statements[4], Statement::Increment(_)));
        assert!(matches!(statements[5], Statement::Decrement(_)));
        let Statement::Assignment(phony) = &statements[6] else {
            panic!("expected a phony assignment");
        };
        assert!(matches!(phony.target, AssignmentTarget::Phony(_)));
        assert!(matches!(statements[7], Statement::Call(_)));
        assert!(matches!(statements[8], Statement::Assignment(_)));
        assert!(matches!(statements[9], Statement::Assignment(_)));
        assert!(matches!(statements[10], Statement::Assignment(_)));
        assert!(matches!(statements[11], Statement::Empty(_)));
        assert!(matches!(statements[12], Statement::Return(_)));
    }

    #[test]
    fn control_flow() {
        let (statements, diagnostics) = parse_body(
            "if a { } else if b { } else { } \
             switch x { case 1, 2: { } case default { } } \
             loop { continue; continuing { break if i > 4; } } \
             for (var i = 0; i < 4; i++) { break; } \
             for (;;) { } \
             while i < 4 { discard; }",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Statement::If(s) = &statements[0] else {
            panic!("expected an if statement");
        };
        assert_eq!(s.else_ifs.len(), 1);
        assert!(s.else_body.is_some());
        let Statement::Switch(s) = &statements[1] else {
            panic!("expected a switch statement");
        };
        assert_eq!(s.clauses.len(), 2);
        let Statement::Loop(s) = &statements[2] else {
            panic!("expected a loop statement");
        };
        assert!(s.continuing.is_some());
        let Statement::For(s) = &statements[3] else {
            panic!("expected a for statement");
        };
        assert!(s.init.is_some() && s.condition.is_some() && s.update.is_some());
        let Statement::For(s) = &statements[4] else {
            panic!("expected a for statement");
        };
        assert!(s.init.is_none() && s.condition.is_none() && s.update.is_none());
        assert!(matches!(statements[5], Statement::While(_)));
    }

    #[test]
    fn misplaced_break_if() {
        let (_, diagnostics) = parse_body("loop { break if true; }");
        assert_eq!(
            diagnostics,
            ["a `break if` statement must be the last statement of a `continuing` block"]
        );
    }

    #[test]
    fn attributes_on_simple_statements() {
        let (_, diagnostics) = parse_body("@must_use return;");
        assert_eq!(
            diagnostics,
            ["attributes are not allowed on this statement"]
        );
    }

    #[test]
    fn statement_recovery() {
        let (statements, diagnostics) = parse_body("let x = ; let y = 1; x + 1; return y;");
        assert_eq!(
            diagnostics,
            [
                "expected expression, but found `;`",
                "expected `=`, compound assignment, `++`, or `--`, but found `+`",
            ]
        );
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[0], Statement::Let(_)));
        assert!(matches!(statements[1], Statement::Return(_)));
    }

    #[test]
    fn switch_clause_recovery() {
        let (statements, diagnostics) =
            parse_body("switch x { case 1 { } let y = 2; default { } }");
        assert_eq!(
            diagnostics,
            ["expected `case` or `default`, but found `let` keyword"]
        );
        let Statement::Switch(s) = &statements[0] else {
            panic!("expected a switch statement");
        };
        assert_eq!(s.clauses.len(), 2);
    }

    #[test]
    fn break_if_at_end_of_continuing() {
        let (_, diagnostics) = parse_body(
            "loop { continuing { break if i > 4; } } \
             loop { break if true; continuing { i++; } }",
        );
        assert_eq!(
            diagnostics,
            ["a `break if` statement must be the last statement of a `continuing` block"]
        );
    }

    #[test]
    fn missing_close_brace() {
        let (_, diagnostics) = parse_body("if a { return;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0], "expected `}`, but found end of input");
    }
}
