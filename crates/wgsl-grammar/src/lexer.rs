//! Module for the lexer implementation.

use line_index::LineIndex;
use logos::Logos;

use crate::Diagnostic;
use crate::Location;
use crate::Span;

mod reserved;
mod token;

pub use reserved::is_reserved;
pub use token::Token;

/// Represents a set of tokens as a bitset.
///
/// The set operates on the "raw" form of tokens (i.e. `u8`) so that sets
/// can be created in const contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenSet(u128);

impl TokenSet {
    /// An empty token set.
    pub const EMPTY: Self = Self(0);

    /// Constructs a token set from a slice of tokens.
    pub const fn new(tokens: &[u8]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < tokens.len() {
            bits |= Self::mask(tokens[i]);
            i += 1;
        }
        Self(bits)
    }

    /// Unions two token sets together.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Checks if the token is contained in the set.
    pub const fn contains(&self, token: u8) -> bool {
        self.0 & Self::mask(token) != 0
    }

    /// Iterates the tokens in the set.
    pub fn iter(&self) -> impl Iterator<Item = Token> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }

            let token = u8::try_from(bits.trailing_zeros())
                .expect("the maximum token value should be less than 128");

            bits ^= bits & bits.overflowing_neg().0;
            Some(Token::from_raw(token))
        })
    }

    /// Masks the given token to a `u128`.
    const fn mask(token: u8) -> u128 {
        1u128 << (token as usize)
    }
}

/// The result type for the lexer.
pub type LexerResult<T> = Result<T, ()>;

/// Implements a WGSL lexer.
///
/// A lexer produces a stream of raw tokens from a WGSL source string,
/// including trivia and lexer errors.
///
/// Most callers want [`tokenize`], which post-processes the raw stream.
#[allow(missing_debug_implementations)]
#[derive(Clone)]
pub struct Lexer<'a> {
    /// The underlying logos lexer.
    lexer: logos::Lexer<'a, Token>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source string.
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Token::lexer(source),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (LexerResult<Token>, Span);

    fn next(&mut self) -> Option<Self::Item> {
        self.lexer.next().map(|r| (r, self.lexer.span().into()))
    }
}

/// A token along with its source text and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    /// The kind of token.
    pub token: Token,
    /// The source text of the token.
    pub text: &'a str,
    /// The byte span of the token.
    pub span: Span,
    /// The line and column where the token starts.
    pub location: Location,
}

/// Extends the given offset to the next character boundary of the source.
fn char_boundary(source: &str, mut offset: usize) -> usize {
    while offset < source.len() && !source.is_char_boundary(offset) {
        offset += 1;
    }

    offset
}

/// Tokenizes the given source.
///
/// The returned tokens cover the entire source, trivia included; every
/// lexical error is represented by a [`Token::Unknown`] or
/// [`Token::MalformedNumber`] token and exactly one diagnostic.
///
/// Identifiers spelled as reserved words are returned as
/// [`Token::Reserved`]. Template lists are not yet discovered, so every
/// `<` is [`Token::Less`] and every `>` is [`Token::Greater`].
pub fn tokenize(source: &str) -> (Vec<Lexeme<'_>>, Vec<Diagnostic>) {
    let index = LineIndex::new(source);
    let mut lexemes: Vec<Lexeme<'_>> = Vec::new();
    let mut diagnostics = Vec::new();

    for (result, span) in Lexer::new(source) {
        let token = match result {
            Ok(Token::Ident) if is_reserved(&source[span.start()..span.end()]) => Token::Reserved,
            Ok(token) => token,
            Err(()) => Token::Unknown,
        };

        if token == Token::Unknown {
            let end = char_boundary(source, span.end());

            // Adjacent unknown characters are reported once
            if let Some(last) = lexemes.last_mut()
                && last.token == Token::Unknown
                && !last.text.starts_with("/*")
                && span.start() <= last.span.end()
            {
                let start = last.span.start();
                last.span = Span::new(start, end - start);
                last.text = &source[start..end];
                continue;
            }

            let start = span.start();
            lexemes.push(Lexeme {
                token,
                text: &source[start..end],
                span: Span::new(start, end - start),
                location: Location::from_offset(&index, start),
            });
            continue;
        }

        lexemes.push(Lexeme {
            token,
            text: &source[span.start()..span.end()],
            span,
            location: Location::from_offset(&index, span.start()),
        });
    }

    for lexeme in &lexemes {
        let mut diagnostic = match lexeme.token {
            Token::Unknown if lexeme.text.starts_with("/*") => {
                Diagnostic::lex_error("unterminated block comment")
                    .with_label("this comment is not terminated", Span::new(lexeme.span.start(), 2))
            }
            Token::Unknown => {
                Diagnostic::lex_error(format!("unknown character `{text}`", text = lexeme.text))
                    .with_highlight(lexeme.span)
            }
            Token::MalformedNumber => Diagnostic::lex_error(format!(
                "invalid numeric literal `{text}`",
                text = lexeme.text
            ))
            .with_label("this is not a valid numeric literal", lexeme.span),
            _ => continue,
        };

        diagnostic.locate(&index);
        diagnostics.push(diagnostic);
    }

    tracing::debug!(
        tokens = lexemes.len(),
        errors = diagnostics.len(),
        "tokenized source"
    );

    (lexemes, diagnostics)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::DiagnosticKind;

    /// Gets the kinds of the tokens of the source.
    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .0
            .into_iter()
            .filter(|l| l.token != Token::Whitespace)
            .map(|l| l.token)
            .collect()
    }

    #[test]
    fn token_set() {
        let set = TokenSet::new(&[Token::Semicolon as u8, Token::CloseBrace as u8]);
        assert!(set.contains(Token::Semicolon as u8));
        assert!(!set.contains(Token::Comma as u8));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            [Token::CloseBrace, Token::Semicolon]
        );

        let set = set.union(TokenSet::new(&[Token::Comma as u8]));
        assert!(set.contains(Token::Comma as u8));
        assert_eq!(TokenSet::EMPTY.iter().count(), 0);
    }

    #[test]
    fn reserved_words_are_reclassified() {
        assert_eq!(
            kinds("var impl : i32;"),
            [
                Token::VarKeyword,
                Token::Reserved,
                Token::Colon,
                Token::Ident,
                Token::Semicolon
            ]
        );
    }

    #[test]
    fn lexemes_have_locations() {
        let (lexemes, diagnostics) = tokenize("fn\n  main");
        assert!(diagnostics.is_empty());
        assert_eq!(lexemes[0].location, Location::new(1, 1));
        assert_eq!(lexemes[2].text, "main");
        assert_eq!(lexemes[2].location, Location::new(2, 3));
    }

    #[test]
    fn malformed_hex_literal() {
        let (lexemes, diagnostics) = tokenize("let x = 0x;");
        assert_eq!(lexemes[6].token, Token::MalformedNumber);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind(), DiagnosticKind::Lex);
        assert_eq!(diagnostics[0].message(), "invalid numeric literal `0x`");
        assert_eq!(diagnostics[0].location(), Some(Location::new(1, 9)));
    }

    #[test]
    fn unknown_characters_are_reported_once() {
        let (lexemes, diagnostics) = tokenize("a $$ b");
        assert_eq!(
            lexemes.iter().map(|l| l.token).collect::<Vec<_>>(),
            [
                Token::Ident,
                Token::Whitespace,
                Token::Unknown,
                Token::Whitespace,
                Token::Ident
            ]
        );
        assert_eq!(lexemes[2].text, "$$");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message(), "unknown character `$$`");
    }

    #[test]
    fn unterminated_comment() {
        let (lexemes, diagnostics) = tokenize("const x = 1; /* oops");
        assert_eq!(lexemes.last().map(|l| l.token), Some(Token::Unknown));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message(), "unterminated block comment");
        assert_eq!(diagnostics[0].span(), Some(Span::new(13, 2)));
    }

    #[test]
    fn tokens_cover_the_source() {
        let source = "@vertex fn main() -> @builtin(position) vec4f { return vec4f(); }";
        let (lexemes, _) = tokenize(source);
        let text: String = lexemes.iter().map(|l| l.text).collect();
        assert_eq!(text, source);
    }
}
