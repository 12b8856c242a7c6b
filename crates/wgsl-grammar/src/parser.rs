//! Module for the parser implementation.
//!
//! The parser consumes the disambiguated token stream and provides the
//! primitives used by the recursive descent functions of the
//! [grammar](crate::grammar): lookahead, expectations that produce
//! diagnostics, delimited list parsing, and token set based error recovery.

use std::fmt;

use crate::Diagnostic;
use crate::Span;
use crate::lexer::Lexeme;
use crate::lexer::Token;
use crate::lexer::TokenSet;

/// Utility type for displaying "expected" items in a parser expectation
/// diagnostic.
struct Expected<'a> {
    /// The set of expected items.
    items: &'a [&'a str],
}

impl<'a> Expected<'a> {
    /// Constructs a new `Expected`.
    fn new(items: &'a [&'a str]) -> Self {
        Self { items }
    }
}

impl fmt::Display for Expected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.items.len();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                if count == 2 {
                    write!(f, " or ")?;
                } else if i == count - 1 {
                    write!(f, ", or ")?;
                } else {
                    write!(f, ", ")?;
                }
            }

            write!(f, "{item}")?;
        }

        Ok(())
    }
}

/// Creates an "expected, but found" diagnostic error.
pub(crate) fn expected_found(expected: &str, found: Option<&str>, span: Span) -> Diagnostic {
    let found = found.unwrap_or("end of input");
    Diagnostic::error(format!("expected {expected}, but found {found}"))
        .with_label(format!("unexpected {found}"), span)
}

/// Creates an "expected one of, but found" diagnostic error.
pub(crate) fn expected_one_of(expected: &[&str], found: Option<&str>, span: Span) -> Diagnostic {
    let found = found.unwrap_or("end of input");
    Diagnostic::error(format!(
        "expected {expected}, but found {found}",
        expected = Expected::new(expected)
    ))
    .with_label(format!("unexpected {found}"), span)
}

/// Creates an "unmatched token" diagnostic error.
pub(crate) fn unmatched(
    open: &str,
    open_span: Span,
    close: &str,
    found: &str,
    span: Span,
) -> Diagnostic {
    expected_found(close, Some(found), span)
        .with_label(format!("this {open} is not matched"), open_span)
}

/// Creates a diagnostic for a reserved word used as an identifier.
pub(crate) fn reserved_word(word: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!(
        "`{word}` is a reserved word and cannot be used as an identifier"
    ))
    .with_label("this word is reserved", span)
}

/// Implements a WGSL parser.
///
/// The parser holds the trivia-free token stream produced by template
/// discovery along with the diagnostics encountered while parsing.
#[derive(Debug)]
pub struct Parser<'a> {
    /// The tokens being parsed.
    tokens: Vec<Lexeme<'a>>,
    /// The index of the next token.
    pos: usize,
    /// The length of the source, used to span the end of input.
    source_len: usize,
    /// The recovery token set stack.
    recovery: Vec<TokenSet>,
    /// The diagnostics encountered so far.
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser for the given tokens.
    ///
    /// The tokens are expected to be free of trivia.
    pub fn new(tokens: Vec<Lexeme<'a>>, source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            source_len,
            recovery: Default::default(),
            diagnostics: Default::default(),
        }
    }

    /// Gets the index of the next token.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Gets the span of the next token.
    ///
    /// At the end of input, a zero-length span at the end of the source is
    /// returned.
    pub fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|l| l.span)
            .unwrap_or_else(|| Span::new(self.source_len, 0))
    }

    /// Gets the span of the last consumed token.
    pub fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|l| l.span)
            .unwrap_or_default()
    }

    /// Gets a span that starts at the given span and ends at the last
    /// consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        let end = self.previous_span().end().max(start.end());
        Span::new(start.start(), end - start.start())
    }

    /// Peeks at the next token without consuming it.
    pub fn peek(&self) -> Option<(Token, Span)> {
        self.tokens.get(self.pos).map(|l| (l.token, l.span))
    }

    /// Peeks at the next lexeme without consuming it.
    pub fn peek_lexeme(&self) -> Option<&Lexeme<'a>> {
        self.tokens.get(self.pos)
    }

    /// Consumes the next token.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(Token, Span)> {
        self.next_lexeme().map(|l| (l.token, l.span))
    }

    /// Consumes the next lexeme.
    pub fn next_lexeme(&mut self) -> Option<Lexeme<'a>> {
        let lexeme = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(lexeme)
    }

    /// Consumes the next token only if it matches the given token.
    ///
    /// Returns `true` if the token was consumed, `false` if otherwise.
    pub fn next_if(&mut self, token: Token) -> bool {
        match self.peek() {
            Some((t, _)) if t == token => {
                self.next();
                true
            }
            _ => false,
        }
    }

    /// Describes the next token for use in diagnostics.
    ///
    /// Returns `None` for the description at the end of input.
    pub fn found(&self) -> (Option<&'static str>, Span) {
        match self.peek() {
            Some((t, s)) => (Some(t.describe()), s),
            None => (None, self.span()),
        }
    }

    /// Requires that the current token is the given token.
    ///
    /// # Panics
    ///
    /// Panics if the token is not the given token.
    pub fn require(&mut self, token: Token) -> Span {
        match self.next() {
            Some((t, span)) if t == token => span,
            _ => panic!(
                "parser not at required token {token}",
                token = token.describe()
            ),
        }
    }

    /// Expects the next token to be the given token.
    ///
    /// Returns an error if the token is not the given token.
    pub fn expect(&mut self, token: Token) -> Result<Span, Diagnostic> {
        self.expect_with_name(token, token.describe())
    }

    /// Expects the next token to be the given token, but uses
    /// the provided name in the error.
    ///
    /// Returns an error if the token is not the given token.
    pub fn expect_with_name(&mut self, token: Token, name: &str) -> Result<Span, Diagnostic> {
        match self.peek() {
            Some((t, span)) if t == token => {
                self.next();
                Ok(span)
            }
            _ => {
                let (found, span) = self.found();
                Err(expected_found(name, found, span))
            }
        }
    }

    /// Expects the next token to be in the given token set.
    ///
    /// Returns an error if the token is not the given set.
    pub fn expect_in(
        &mut self,
        tokens: TokenSet,
        expected: &[&str],
    ) -> Result<(Token, Span), Diagnostic> {
        match self.peek() {
            Some((t, span)) if tokens.contains(t.into_raw()) => {
                self.next();
                Ok((t, span))
            }
            _ => {
                let (found, span) = self.found();
                Err(expected_one_of(expected, found, span))
            }
        }
    }

    /// Expects the next token to be an identifier.
    ///
    /// The `name` describes the expected identifier (e.g. "function name").
    /// A reserved word produces a dedicated diagnostic labelled at the word.
    pub fn expect_ident(&mut self, name: &str) -> Result<(&'a str, Span), Diagnostic> {
        match self.peek_lexeme().copied() {
            Some(lexeme) if lexeme.token == Token::Ident => {
                self.next();
                Ok((lexeme.text, lexeme.span))
            }
            Some(lexeme) if lexeme.token == Token::Reserved => {
                Err(reserved_word(lexeme.text, lexeme.span))
            }
            _ => {
                let (found, span) = self.found();
                Err(expected_found(name, found, span))
            }
        }
    }

    /// Parses a matching token pair that surround a delimited list of items.
    ///
    /// This method parses the open token, calls the callback for each delimited
    /// item, and then parses the close token.
    ///
    /// Returns the items and the span from the open token through the close
    /// token.
    pub fn matching_delimited<T, F>(
        &mut self,
        open: Token,
        close: Token,
        delimiter: Option<Token>,
        recovery: TokenSet,
        cb: F,
    ) -> Result<(Vec<T>, Span), Diagnostic>
    where
        F: FnMut(&mut Self) -> Result<T, Diagnostic>,
    {
        let open_span = self.expect(open)?;
        let items = self.delimited(close, delimiter, recovery, cb);
        let close_span = self.consume_close_token(open, open_span, close);
        Ok((items, open_span.cover(close_span)))
    }

    /// Consumes a close token if it is the next token to be parsed.
    ///
    /// Otherwise, emits an "unmatched" diagnostic and returns a zero-length
    /// span where the close token was expected.
    pub fn consume_close_token(&mut self, open: Token, open_span: Span, close: Token) -> Span {
        if let Some((t, span)) = self.peek()
            && t == close
        {
            self.next();
            return span;
        }

        let (found, span) = self.found();
        let diagnostic = unmatched(
            open.describe(),
            open_span,
            close.describe(),
            found.unwrap_or("end of input"),
            span,
        );
        self.diagnostic(diagnostic);
        Span::new(span.start(), 0)
    }

    /// Parses a delimited list of items until the given token.
    ///
    /// The provided recovery token set is used to recover within the delimited
    /// item list. If an error occurs at a token that the enclosing recovery
    /// set can handle, the list ends early instead.
    ///
    /// The `until` token is not consumed.
    pub fn delimited<T, F>(
        &mut self,
        until: Token,
        delimiter: Option<Token>,
        recovery: TokenSet,
        mut cb: F,
    ) -> Vec<T>
    where
        F: FnMut(&mut Self) -> Result<T, Diagnostic>,
    {
        let recovery = if let Some(delimiter) = delimiter {
            recovery.union(TokenSet::new(&[until.into_raw(), delimiter.into_raw()]))
        } else {
            recovery.union(TokenSet::new(&[until.into_raw()]))
        };

        let parent = self.recovery.last().copied();
        self.recovery.push(recovery);

        let mut items = Vec::new();
        let mut next = self.peek();
        while let Some((token, _)) = next {
            if token == until {
                break;
            }

            let start = self.pos;
            match cb(self) {
                Ok(item) => items.push(item),
                Err(e) => {
                    if self.yields_to(parent, recovery) {
                        self.diagnostic(e);
                        break;
                    }

                    self.recover(e);
                    if self.pos == start && self.peek().is_some_and(|(t, _)| t != until) {
                        self.next();
                    }
                }
            }

            next = self.peek();

            if let Some(delimiter) = delimiter
                && let Some((token, _)) = next
            {
                if token == until {
                    break;
                }

                if let Err(e) = self.expect(delimiter) {
                    // Hint at where the delimiter was expected
                    let previous = self.previous_span();
                    let e = if previous.is_empty() {
                        e
                    } else {
                        e.with_label(
                            format!(
                                "consider adding a {desc} after this",
                                desc = delimiter.describe()
                            ),
                            Span::new(previous.end() - 1, 1),
                        )
                    };

                    if self.yields_to(parent, recovery) {
                        self.diagnostic(e);
                        break;
                    }

                    self.recover(e);
                    self.next_if(delimiter);
                }

                next = self.peek();
            }
        }

        self.recovery.pop();
        items
    }

    /// Determines if the next token belongs to the parent recovery set but
    /// not to the current one.
    fn yields_to(&self, parent: Option<TokenSet>, current: TokenSet) -> bool {
        match (self.peek(), parent) {
            (Some((token, _)), Some(parent)) => {
                !current.contains(token.into_raw()) && parent.contains(token.into_raw())
            }
            _ => false,
        }
    }

    /// Adds a diagnostic to the parser output.
    ///
    /// Syntax errors reported while input remains are marked as recovered.
    pub fn diagnostic(&mut self, diagnostic: Diagnostic) {
        let diagnostic = if self.peek().is_some() {
            diagnostic.recovered()
        } else {
            diagnostic
        };

        self.diagnostics.push(diagnostic);
    }

    /// Gets the number of diagnostics reported so far.
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Discards the diagnostics reported after the given count.
    pub fn truncate_diagnostics(&mut self, count: usize) {
        self.diagnostics.truncate(count);
    }

    /// Pushes a token set to the parser's recovery token set stack.
    pub fn push_recovery_set(&mut self, tokens: TokenSet) {
        self.recovery.push(tokens);
    }

    /// Pops a token set from the parser's recovery token set stack.
    ///
    /// # Panics
    ///
    /// Panics if the parser's recovery set is empty.
    pub fn pop_recovery_set(&mut self) {
        self.recovery.pop().expect("should pop");
    }

    /// Recovers from an error by consuming all tokens not in the top-most
    /// recovery set.
    ///
    /// Bracketed groups are skipped as a whole: a token in the recovery set
    /// only stops recovery when it is not nested within brackets opened
    /// during recovery.
    ///
    /// # Panics
    ///
    /// Panics if a recovery set was not pushed with [Self::push_recovery_set].
    pub fn recover(&mut self, diagnostic: Diagnostic) {
        let tokens = *self.recovery.last().expect("expected a top recovery set");

        let mut depth = 0usize;
        while let Some((token, _)) = self.peek() {
            if depth == 0 && tokens.contains(token.into_raw()) {
                break;
            }

            match token {
                Token::OpenBrace | Token::OpenParen | Token::OpenBracket => depth += 1,
                Token::CloseBrace | Token::CloseParen | Token::CloseBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }

            self.next();
        }

        self.diagnostic(diagnostic);
    }

    /// Consumes every remaining token.
    pub fn skip_to_end(&mut self) {
        self.pos = self.tokens.len();
    }

    /// Consumes the parser and returns the diagnostics it reported.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer::tokenize;

    /// Creates a parser over the trivia-free tokens of the source.
    fn parser(source: &str) -> Parser<'_> {
        let tokens = tokenize(source)
            .0
            .into_iter()
            .filter(|l| !l.token.is_trivia())
            .collect();
        Parser::new(tokens, source.len())
    }

    #[test]
    fn expected_display() {
        assert_eq!(Expected::new(&["a"]).to_string(), "a");
        assert_eq!(Expected::new(&["a", "b"]).to_string(), "a or b");
        assert_eq!(Expected::new(&["a", "b", "c"]).to_string(), "a, b, or c");
    }

    #[test]
    fn expect_reports_found_token() {
        let mut parser = parser("fn ;");
        assert_eq!(parser.expect(Token::FnKeyword), Ok(Span::new(0, 2)));
        let e = parser.expect(Token::Ident).unwrap_err();
        assert_eq!(e.message(), "expected identifier, but found `;`");
        assert_eq!(e.span(), Some(Span::new(3, 1)));
    }

    #[test]
    fn expect_at_end_of_input() {
        let mut parser = parser("fn");
        parser.next();
        let e = parser.expect(Token::Ident).unwrap_err();
        assert_eq!(e.message(), "expected identifier, but found end of input");
        assert_eq!(e.span(), Some(Span::new(2, 0)));
    }

    #[test]
    fn reserved_identifier() {
        let mut parser = parser("impl");
        let e = parser.expect_ident("variable name").unwrap_err();
        assert_eq!(
            e.message(),
            "`impl` is a reserved word and cannot be used as an identifier"
        );
        assert_eq!(e.span(), Some(Span::new(0, 4)));
    }

    #[test]
    fn delimited_recovers_missing_delimiter() {
        let mut parser = parser("(a b, c)");
        parser.push_recovery_set(TokenSet::EMPTY);
        let (items, span) = parser
            .matching_delimited(
                Token::OpenParen,
                Token::CloseParen,
                Some(Token::Comma),
                TokenSet::new(&[Token::Ident as u8]),
                |p| p.expect_ident("name").map(|(text, _)| text),
            )
            .unwrap();
        assert_eq!(items, ["a", "b", "c"]);
        assert_eq!(span, Span::new(0, 8));

        let diagnostics = parser.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "expected `,`, but found identifier"
        );
        assert_eq!(
            diagnostics[0].labels().nth(1).map(|l| l.message()),
            Some("consider adding a `,` after this")
        );
    }

    #[test]
    fn recovery_skips_bracketed_groups() {
        let mut parser = parser("a (b; c) ; d");
        parser.push_recovery_set(TokenSet::new(&[Token::Semicolon as u8]));
        parser.recover(Diagnostic::error("oops"));
        assert_eq!(parser.peek().map(|(t, _)| t), Some(Token::Semicolon));
        assert_eq!(parser.span(), Span::new(9, 1));
        assert_eq!(parser.finish().len(), 1);
    }

    #[test]
    fn expect_in_reports_every_expected_token() {
        let mut parser = parser("default case ;");
        let set = TokenSet::new(&[Token::CaseKeyword as u8, Token::DefaultKeyword as u8]);
        assert_eq!(
            parser.expect_in(set, &["`case`", "`default`"]),
            Ok((Token::DefaultKeyword, Span::new(0, 7)))
        );
        assert_eq!(
            parser.expect_in(set, &["`case`", "`default`"]),
            Ok((Token::CaseKeyword, Span::new(8, 4)))
        );
        let e = parser.expect_in(set, &["`case`", "`default`"]).unwrap_err();
        assert_eq!(e.message(), "expected `case` or `default`, but found `;`");
        assert_eq!(e.span(), Some(Span::new(13, 1)));
    }

    #[test]
    fn unmatched_close_token() {
        let mut parser = parser("(a");
        parser.push_recovery_set(TokenSet::EMPTY);
        let result = parser.matching_delimited(
            Token::OpenParen,
            Token::CloseParen,
            Some(Token::Comma),
            TokenSet::EMPTY,
            |p| p.expect_ident("name"),
        );
        assert!(result.is_ok());
        let diagnostics = parser.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "expected `)`, but found end of input"
        );
    }
}
