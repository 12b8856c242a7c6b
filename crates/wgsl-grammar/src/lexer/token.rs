//! WGSL tokens.

pub use logos::Logos;

/// Lexes the remainder of a (possibly nested) block comment.
///
/// The opening `/*` has already been matched.
///
/// Returns `false` if the comment is not terminated, which produces a lexer
/// error spanning the rest of the source.
fn block_comment(lexer: &mut logos::Lexer<'_, Token>) -> bool {
    let bytes = lexer.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    lexer.bump(i);
                    return true;
                }
            }
            _ => i += 1,
        }
    }

    lexer.bump(bytes.len());
    false
}

/// Represents a WGSL token.
///
/// Variants without a pattern are never produced by the logos lexer:
/// [`Token::Reserved`] and [`Token::Unknown`] are assigned by
/// [`tokenize`](crate::tokenize) and the remaining ones are synthesized by
/// template list discovery.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
#[logos(subpattern dec_exp = r"[eE][+-]?[0-9]+")]
#[logos(subpattern hex_exp = r"[pP][+-]?[0-9]+")]
pub enum Token {
    /// Contiguous blankspace.
    #[regex(r"[ \t\n\x0B\x0C\r\u{85}\u{200E}\u{200F}\u{2028}\u{2029}]+")]
    Whitespace,
    /// A line comment.
    #[regex(r"//[^\n\x0B\x0C\r\u{85}\u{2028}\u{2029}]*")]
    LineComment,
    /// A block comment, which may nest.
    #[token("/*", block_comment)]
    BlockComment,

    /// A decimal integer literal (e.g. `0`, `12u`).
    #[regex(r"(0|[1-9][0-9]*)[iu]?", priority = 4)]
    DecimalIntLiteral,
    /// A hexadecimal integer literal (e.g. `0x1F`).
    #[regex(r"0[xX][0-9a-fA-F]+[iu]?", priority = 4)]
    HexIntLiteral,
    /// A decimal floating point literal (e.g. `1.5e10f`).
    #[regex(
        r"0[fh]|[1-9][0-9]*[fh]|([0-9]*\.[0-9]+|[0-9]+\.[0-9]*)(?&dec_exp)?[fh]?|[0-9]+(?&dec_exp)[fh]?",
        priority = 4
    )]
    DecimalFloatLiteral,
    /// A hexadecimal floating point literal (e.g. `0x1p3f`).
    #[regex(
        r"0[xX]([0-9a-fA-F]*\.[0-9a-fA-F]+|[0-9a-fA-F]+\.[0-9a-fA-F]*)((?&hex_exp)[fh]?)?|0[xX][0-9a-fA-F]+(?&hex_exp)[fh]?",
        priority = 4
    )]
    HexFloatLiteral,
    /// A run of digits and identifier characters that does not form a
    /// valid numeric literal (e.g. `0x` or `12abc`).
    #[regex(r"[0-9][0-9a-zA-Z_]*", priority = 1)]
    MalformedNumber,

    /// An identifier.
    #[regex(r"[_\p{XID_Start}]\p{XID_Continue}+|\p{XID_Start}")]
    Ident,
    /// An identifier that is spelled as a reserved word.
    ///
    /// Reserved words are lexed as identifiers and reclassified afterwards.
    Reserved,

    /// The `alias` keyword.
    #[token("alias")]
    AliasKeyword,
    /// The `break` keyword.
    #[token("break")]
    BreakKeyword,
    /// The `case` keyword.
    #[token("case")]
    CaseKeyword,
    /// The `const` keyword.
    #[token("const")]
    ConstKeyword,
    /// The `const_assert` keyword.
    #[token("const_assert")]
    ConstAssertKeyword,
    /// The `continue` keyword.
    #[token("continue")]
    ContinueKeyword,
    /// The `continuing` keyword.
    #[token("continuing")]
    ContinuingKeyword,
    /// The `default` keyword.
    #[token("default")]
    DefaultKeyword,
    /// The `diagnostic` keyword.
    #[token("diagnostic")]
    DiagnosticKeyword,
    /// The `discard` keyword.
    #[token("discard")]
    DiscardKeyword,
    /// The `else` keyword.
    #[token("else")]
    ElseKeyword,
    /// The `enable` keyword.
    #[token("enable")]
    EnableKeyword,
    /// The `false` keyword.
    #[token("false")]
    FalseKeyword,
    /// The `fn` keyword.
    #[token("fn")]
    FnKeyword,
    /// The `for` keyword.
    #[token("for")]
    ForKeyword,
    /// The `if` keyword.
    #[token("if")]
    IfKeyword,
    /// The `let` keyword.
    #[token("let")]
    LetKeyword,
    /// The `loop` keyword.
    #[token("loop")]
    LoopKeyword,
    /// The `override` keyword.
    #[token("override")]
    OverrideKeyword,
    /// The `requires` keyword.
    #[token("requires")]
    RequiresKeyword,
    /// The `return` keyword.
    #[token("return")]
    ReturnKeyword,
    /// The `struct` keyword.
    #[token("struct")]
    StructKeyword,
    /// The `switch` keyword.
    #[token("switch")]
    SwitchKeyword,
    /// The `true` keyword.
    #[token("true")]
    TrueKeyword,
    /// The `var` keyword.
    #[token("var")]
    VarKeyword,
    /// The `while` keyword.
    #[token("while")]
    WhileKeyword,

    /// The `&` symbol.
    #[token("&")]
    And,
    /// The `&&` symbol.
    #[token("&&")]
    AndAnd,
    /// The `->` symbol.
    #[token("->")]
    Arrow,
    /// The `@` symbol.
    #[token("@")]
    Attr,
    /// The `/` symbol.
    #[token("/")]
    Slash,
    /// The `!` symbol.
    #[token("!")]
    Bang,
    /// The `[` symbol.
    #[token("[")]
    OpenBracket,
    /// The `]` symbol.
    #[token("]")]
    CloseBracket,
    /// The `{` symbol.
    #[token("{")]
    OpenBrace,
    /// The `}` symbol.
    #[token("}")]
    CloseBrace,
    /// The `:` symbol.
    #[token(":")]
    Colon,
    /// The `,` symbol.
    #[token(",")]
    Comma,
    /// The `=` symbol.
    #[token("=")]
    Assignment,
    /// The `==` symbol.
    #[token("==")]
    Equal,
    /// The `!=` symbol.
    #[token("!=")]
    NotEqual,
    /// The `>` symbol.
    ///
    /// `>=`, `>>`, and `>>=` are never lexed directly; see
    /// [`Token::GreaterEqual`].
    #[token(">")]
    Greater,
    /// The `<` symbol.
    #[token("<")]
    Less,
    /// The `<=` symbol.
    #[token("<=")]
    LessEqual,
    /// The `<<` symbol.
    #[token("<<")]
    ShiftLeft,
    /// The `%` symbol.
    #[token("%")]
    Percent,
    /// The `-` symbol.
    #[token("-")]
    Minus,
    /// The `--` symbol.
    #[token("--")]
    MinusMinus,
    /// The `.` symbol.
    #[token(".")]
    Period,
    /// The `+` symbol.
    #[token("+")]
    Plus,
    /// The `++` symbol.
    #[token("++")]
    PlusPlus,
    /// The `|` symbol.
    #[token("|")]
    Or,
    /// The `||` symbol.
    #[token("||")]
    OrOr,
    /// The `(` symbol.
    #[token("(")]
    OpenParen,
    /// The `)` symbol.
    #[token(")")]
    CloseParen,
    /// The `;` symbol.
    #[token(";")]
    Semicolon,
    /// The `*` symbol.
    #[token("*")]
    Star,
    /// The `~` symbol.
    #[token("~")]
    Tilde,
    /// The `_` symbol.
    #[token("_")]
    Underscore,
    /// The `^` symbol.
    #[token("^")]
    Xor,
    /// The `+=` symbol.
    #[token("+=")]
    PlusAssign,
    /// The `-=` symbol.
    #[token("-=")]
    MinusAssign,
    /// The `*=` symbol.
    #[token("*=")]
    StarAssign,
    /// The `/=` symbol.
    #[token("/=")]
    SlashAssign,
    /// The `%=` symbol.
    #[token("%=")]
    PercentAssign,
    /// The `&=` symbol.
    #[token("&=")]
    AndAssign,
    /// The `|=` symbol.
    #[token("|=")]
    OrAssign,
    /// The `^=` symbol.
    #[token("^=")]
    XorAssign,
    /// The `<<=` symbol.
    #[token("<<=")]
    ShiftLeftAssign,

    /// A character sequence that could not be lexed.
    ///
    /// The lexer never produces this directly; lexer errors are converted
    /// into this token so that the token stream covers the whole source.
    Unknown,

    /// A `<` that starts a template list.
    TemplateArgsStart,
    /// A `>` that ends a template list.
    TemplateArgsEnd,
    /// The `>=` operator.
    GreaterEqual,
    /// The `>>` operator.
    ShiftRight,
    /// The `>>=` operator.
    ShiftRightAssign,

    // WARNING: this must always be the last variant.
    /// The exclusive maximum token value.
    MAX,
}

/// Asserts that Token can fit in a TokenSet.
const _: () = assert!(Token::MAX as u8 <= 128);

impl Token {
    /// Converts the token into its "raw" representation.
    pub const fn into_raw(self) -> u8 {
        self as u8
    }

    /// Converts from a raw token into a token.
    ///
    /// # Panics
    ///
    /// Panics if the raw value is not a valid token.
    pub fn from_raw(token: u8) -> Self {
        assert!(token < Self::MAX as u8, "invalid token value");
        // SAFETY: the enum is `repr(u8)` and the value was checked to be in range
        unsafe { std::mem::transmute::<u8, Self>(token) }
    }

    /// Describes the token for use in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LineComment | Self::BlockComment => "comment",
            Self::DecimalIntLiteral | Self::HexIntLiteral => "integer literal",
            Self::DecimalFloatLiteral | Self::HexFloatLiteral => "float literal",
            Self::MalformedNumber => "malformed number",
            Self::Ident => "identifier",
            Self::Reserved => "reserved word",
            Self::AliasKeyword => "`alias` keyword",
            Self::BreakKeyword => "`break` keyword",
            Self::CaseKeyword => "`case` keyword",
            Self::ConstKeyword => "`const` keyword",
            Self::ConstAssertKeyword => "`const_assert` keyword",
            Self::ContinueKeyword => "`continue` keyword",
            Self::ContinuingKeyword => "`continuing` keyword",
            Self::DefaultKeyword => "`default` keyword",
            Self::DiagnosticKeyword => "`diagnostic` keyword",
            Self::DiscardKeyword => "`discard` keyword",
            Self::ElseKeyword => "`else` keyword",
            Self::EnableKeyword => "`enable` keyword",
            Self::FalseKeyword => "`false` keyword",
            Self::FnKeyword => "`fn` keyword",
            Self::ForKeyword => "`for` keyword",
            Self::IfKeyword => "`if` keyword",
            Self::LetKeyword => "`let` keyword",
            Self::LoopKeyword => "`loop` keyword",
            Self::OverrideKeyword => "`override` keyword",
            Self::RequiresKeyword => "`requires` keyword",
            Self::ReturnKeyword => "`return` keyword",
            Self::StructKeyword => "`struct` keyword",
            Self::SwitchKeyword => "`switch` keyword",
            Self::TrueKeyword => "`true` keyword",
            Self::VarKeyword => "`var` keyword",
            Self::WhileKeyword => "`while` keyword",
            Self::And => "`&`",
            Self::AndAnd => "`&&`",
            Self::Arrow => "`->`",
            Self::Attr => "`@`",
            Self::Slash => "`/`",
            Self::Bang => "`!`",
            Self::OpenBracket => "`[`",
            Self::CloseBracket => "`]`",
            Self::OpenBrace => "`{`",
            Self::CloseBrace => "`}`",
            Self::Colon => "`:`",
            Self::Comma => "`,`",
            Self::Assignment => "`=`",
            Self::Equal => "`==`",
            Self::NotEqual => "`!=`",
            Self::Greater => "`>`",
            Self::Less => "`<`",
            Self::LessEqual => "`<=`",
            Self::ShiftLeft => "`<<`",
            Self::Percent => "`%`",
            Self::Minus => "`-`",
            Self::MinusMinus => "`--`",
            Self::Period => "`.`",
            Self::Plus => "`+`",
            Self::PlusPlus => "`++`",
            Self::Or => "`|`",
            Self::OrOr => "`||`",
            Self::OpenParen => "`(`",
            Self::CloseParen => "`)`",
            Self::Semicolon => "`;`",
            Self::Star => "`*`",
            Self::Tilde => "`~`",
            Self::Underscore => "`_`",
            Self::Xor => "`^`",
            Self::PlusAssign => "`+=`",
            Self::MinusAssign => "`-=`",
            Self::StarAssign => "`*=`",
            Self::SlashAssign => "`/=`",
            Self::PercentAssign => "`%=`",
            Self::AndAssign => "`&=`",
            Self::OrAssign => "`|=`",
            Self::XorAssign => "`^=`",
            Self::ShiftLeftAssign => "`<<=`",
            Self::Unknown => "unknown token",
            Self::TemplateArgsStart => "template list start",
            Self::TemplateArgsEnd => "template list end",
            Self::GreaterEqual => "`>=`",
            Self::ShiftRight => "`>>`",
            Self::ShiftRightAssign => "`>>=`",
            Self::MAX => unreachable!(),
        }
    }

    /// Determines if the token is trivia that should be skipped over by the
    /// parser.
    ///
    /// Unknown tokens are treated as trivia; the lexer has already reported
    /// them. Malformed numbers are not, as they still stand in for a literal.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment | Self::Unknown
        )
    }

    /// Determines if the token is a keyword.
    pub fn is_keyword(self) -> bool {
        (Self::AliasKeyword as u8..=Self::WhileKeyword as u8).contains(&(self as u8))
    }

    /// Determines if the token is shaped like an identifier.
    ///
    /// Keywords and reserved words are identifier-shaped; an
    /// identifier-shaped token followed by `<` may start a template list.
    pub fn is_ident_like(self) -> bool {
        matches!(self, Self::Ident | Self::Reserved) || self.is_keyword()
    }

    /// Determines if the token is a literal (including `true` and `false`).
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::DecimalIntLiteral
                | Self::HexIntLiteral
                | Self::DecimalFloatLiteral
                | Self::HexFloatLiteral
                | Self::TrueKeyword
                | Self::FalseKeyword
        )
    }

    /// Determines if the token is `=` or a compound assignment operator.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assignment
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::StarAssign
                | Self::SlashAssign
                | Self::PercentAssign
                | Self::AndAssign
                | Self::OrAssign
                | Self::XorAssign
                | Self::ShiftLeftAssign
                | Self::ShiftRightAssign
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Span;
    use crate::lexer::Lexer;
    use crate::lexer::LexerResult;

    /// Maps a lexer result to one with a byte range.
    fn map((t, s): (LexerResult<Token>, Span)) -> (LexerResult<Token>, std::ops::Range<usize>) {
        (t, s.start()..s.end())
    }

    /// Lexes the source with its raw spans.
    fn lex(source: &str) -> Vec<(LexerResult<Token>, std::ops::Range<usize>)> {
        Lexer::new(source).map(map).collect()
    }

    #[test]
    fn whitespace_and_comments() {
        assert_eq!(
            lex(" \t\n// line\n/* block /* nested */ still */x"),
            vec![
                (Ok(Token::Whitespace), 0..3),
                (Ok(Token::LineComment), 3..10),
                (Ok(Token::Whitespace), 10..11),
                (Ok(Token::BlockComment), 11..41),
                (Ok(Token::Ident), 41..42),
            ]
        );
    }

    #[test]
    fn unterminated_block_comment() {
        assert_eq!(
            lex("x /* never /* closed */"),
            vec![
                (Ok(Token::Ident), 0..1),
                (Ok(Token::Whitespace), 1..2),
                (Err(()), 2..23),
            ]
        );
    }

    #[test]
    fn integer_literals() {
        assert_eq!(
            lex("0 0i 1u 123 0x1F 0XaBu"),
            vec![
                (Ok(Token::DecimalIntLiteral), 0..1),
                (Ok(Token::Whitespace), 1..2),
                (Ok(Token::DecimalIntLiteral), 2..4),
                (Ok(Token::Whitespace), 4..5),
                (Ok(Token::DecimalIntLiteral), 5..7),
                (Ok(Token::Whitespace), 7..8),
                (Ok(Token::DecimalIntLiteral), 8..11),
                (Ok(Token::Whitespace), 11..12),
                (Ok(Token::HexIntLiteral), 12..16),
                (Ok(Token::Whitespace), 16..17),
                (Ok(Token::HexIntLiteral), 17..22),
            ]
        );
    }

    #[test]
    fn float_literals() {
        assert_eq!(
            lex("0f 1h 1.5e10f .5 1. 2e-3 0x1p3f 0x1.8 0x.8p-2h"),
            vec![
                (Ok(Token::DecimalFloatLiteral), 0..2),
                (Ok(Token::Whitespace), 2..3),
                (Ok(Token::DecimalFloatLiteral), 3..5),
                (Ok(Token::Whitespace), 5..6),
                (Ok(Token::DecimalFloatLiteral), 6..13),
                (Ok(Token::Whitespace), 13..14),
                (Ok(Token::DecimalFloatLiteral), 14..16),
                (Ok(Token::Whitespace), 16..17),
                (Ok(Token::DecimalFloatLiteral), 17..19),
                (Ok(Token::Whitespace), 19..20),
                (Ok(Token::DecimalFloatLiteral), 20..24),
                (Ok(Token::Whitespace), 24..25),
                (Ok(Token::HexFloatLiteral), 25..31),
                (Ok(Token::Whitespace), 31..32),
                (Ok(Token::HexFloatLiteral), 32..37),
                (Ok(Token::Whitespace), 37..38),
                (Ok(Token::HexFloatLiteral), 38..46),
            ]
        );
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(
            lex("0x 12abc 01"),
            vec![
                (Ok(Token::MalformedNumber), 0..2),
                (Ok(Token::Whitespace), 2..3),
                (Ok(Token::MalformedNumber), 3..8),
                (Ok(Token::Whitespace), 8..9),
                (Ok(Token::MalformedNumber), 9..11),
            ]
        );
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            lex("fn _x Δέλτα var_ a1 _"),
            vec![
                (Ok(Token::FnKeyword), 0..2),
                (Ok(Token::Whitespace), 2..3),
                (Ok(Token::Ident), 3..5),
                (Ok(Token::Whitespace), 5..6),
                (Ok(Token::Ident), 6..16),
                (Ok(Token::Whitespace), 16..17),
                (Ok(Token::Ident), 17..21),
                (Ok(Token::Whitespace), 21..22),
                (Ok(Token::Ident), 22..24),
                (Ok(Token::Whitespace), 24..25),
                (Ok(Token::Underscore), 25..26),
            ]
        );
    }

    #[test]
    fn greater_than_is_always_single() {
        assert_eq!(
            lex("a>>=b>=c"),
            vec![
                (Ok(Token::Ident), 0..1),
                (Ok(Token::Greater), 1..2),
                (Ok(Token::Greater), 2..3),
                (Ok(Token::Assignment), 3..4),
                (Ok(Token::Ident), 4..5),
                (Ok(Token::Greater), 5..6),
                (Ok(Token::Assignment), 6..7),
                (Ok(Token::Ident), 7..8),
            ]
        );
    }

    #[test]
    fn less_than_family() {
        assert_eq!(
            lex("<<=<<<=<"),
            vec![
                (Ok(Token::ShiftLeftAssign), 0..3),
                (Ok(Token::ShiftLeft), 3..5),
                (Ok(Token::LessEqual), 5..7),
                (Ok(Token::Less), 7..8),
            ]
        );
    }

    #[test]
    fn keyword_classification() {
        assert!(Token::AliasKeyword.is_keyword());
        assert!(Token::WhileKeyword.is_keyword());
        assert!(!Token::Ident.is_keyword());
        assert!(!Token::And.is_keyword());
        assert!(Token::VarKeyword.is_ident_like());
        assert!(Token::Reserved.is_ident_like());
        assert_eq!(Token::from_raw(Token::Semicolon.into_raw()), Token::Semicolon);
    }
}
