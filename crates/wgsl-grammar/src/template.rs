//! Template list discovery.
//!
//! WGSL uses `<` and `>` both as comparison operators and as template list
//! delimiters (e.g. `array<f32, 4>`). Discovery classifies each `<` and `>`
//! in a single left-to-right pass over the trivia-free token stream before
//! parsing, so that the parser never has to backtrack:
//!
//! * an identifier-shaped token immediately followed by `<` opens a
//!   candidate template list;
//! * a `>` at the same bracket depth as the innermost candidate closes it;
//! * tokens that cannot appear inside a template list (`;`, `{`, `}`, `:`,
//!   and assignments) discard every pending candidate, while `)`, `]`, `&&`,
//!   and `||` discard the candidates of the current depth.
//!
//! Once discovery is complete, the remaining adjacent `>`/`=` tokens are
//! merged into the `>=`, `>>`, and `>>=` operators.

use line_index::LineIndex;

use crate::Diagnostic;
use crate::Span;
use crate::lexer::Lexeme;
use crate::lexer::Token;

/// A `<` that may start a template list.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// The index of the `<` token.
    index: usize,
    /// The bracket depth at which the candidate was opened.
    depth: usize,
}

/// Discards the pending candidates opened at the given depth.
fn discard_depth(pending: &mut Vec<Candidate>, depth: usize) {
    while pending.last().is_some_and(|c| c.depth == depth) {
        pending.pop();
    }
}

/// Determines if the token at `index` is the given token and directly
/// follows the previous token with no intervening trivia.
fn is_adjacent(tokens: &[Lexeme<'_>], index: usize, token: Token) -> bool {
    index > 0
        && tokens
            .get(index)
            .is_some_and(|l| l.token == token && l.span.start() == tokens[index - 1].span.end())
}

/// Discovers template lists in the given trivia-free token stream.
///
/// Every `<` and `>` that delimit a template list are rewritten to
/// [`Token::TemplateArgsStart`] and [`Token::TemplateArgsEnd`]; the
/// remaining `>` tokens are merged with adjacent `>` and `=` tokens into
/// comparison, shift, and shift-assignment operators.
///
/// Returns a disambiguation diagnostic if the end of input is reached while
/// a candidate is still unresolved; the diagnostic is anchored at the
/// outermost unresolved `<` and located in the source.
pub fn discover<'a>(
    source: &'a str,
    mut tokens: Vec<Lexeme<'a>>,
) -> (Vec<Lexeme<'a>>, Option<Diagnostic>) {
    let mut pending: Vec<Candidate> = Vec::new();
    let mut depth = 0;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].token;

        if token.is_ident_like() {
            if tokens.get(i + 1).is_some_and(|l| l.token == Token::Less) {
                pending.push(Candidate {
                    index: i + 1,
                    depth,
                });
                i += 2;
                continue;
            }

            i += 1;
            continue;
        }

        match token {
            Token::Greater => match pending.last() {
                Some(candidate) if candidate.depth == depth => {
                    let start = tokens[candidate.index].span;
                    tokens[candidate.index].token = Token::TemplateArgsStart;
                    tokens[i].token = Token::TemplateArgsEnd;
                    tracing::trace!(
                        start = start.start(),
                        end = tokens[i].span.end(),
                        "discovered template list"
                    );
                    pending.pop();
                }
                _ => {
                    // A `>=` operator
                    if is_adjacent(&tokens, i + 1, Token::Assignment) {
                        i += 1;
                    }
                }
            },
            Token::OpenParen | Token::OpenBracket => depth += 1,
            Token::CloseParen | Token::CloseBracket => {
                discard_depth(&mut pending, depth);
                depth = depth.saturating_sub(1);
            }
            Token::AndAnd | Token::OrOr => discard_depth(&mut pending, depth),
            Token::Semicolon | Token::OpenBrace | Token::CloseBrace | Token::Colon => {
                pending.clear();
                depth = 0;
            }
            t if t.is_assignment() => {
                pending.clear();
                depth = 0;
            }
            _ => {}
        }

        i += 1;
    }

    let failure = pending.first().map(|candidate| {
        let span = tokens[candidate.index].span;
        let mut diagnostic = Diagnostic::disambiguation_error(
            "unable to determine whether `<` starts a template list before the end of input",
        )
        .with_label("this `<` is never resolved", span)
        .with_fix("terminate the enclosing declaration or statement with `;` or `}`");
        diagnostic.locate(&LineIndex::new(source));
        diagnostic
    });

    (merge_operators(source, tokens), failure)
}

/// Merges adjacent `>`, `>` `>`, and `>` `>` `=` sequences that are not
/// template list delimiters into single operator tokens.
fn merge_operators<'a>(source: &'a str, tokens: Vec<Lexeme<'a>>) -> Vec<Lexeme<'a>> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let lexeme = tokens[i];
        if lexeme.token != Token::Greater {
            merged.push(lexeme);
            i += 1;
            continue;
        }

        let (token, len) = if is_adjacent(&tokens, i + 1, Token::Greater)
            && is_adjacent(&tokens, i + 2, Token::Assignment)
        {
            (Token::ShiftRightAssign, 3)
        } else if is_adjacent(&tokens, i + 1, Token::Greater) {
            (Token::ShiftRight, 2)
        } else if is_adjacent(&tokens, i + 1, Token::Assignment) {
            (Token::GreaterEqual, 2)
        } else {
            (Token::Greater, 1)
        };

        let start = lexeme.span.start();
        let end = tokens[i + len - 1].span.end();
        merged.push(Lexeme {
            token,
            text: &source[start..end],
            span: Span::new(start, end - start),
            location: lexeme.location,
        });
        i += len;
    }

    merged
}
