//! Expression nodes.

use super::Ident;
use super::TemplateElaboratedIdent;
use crate::Span;
use crate::lexer::Token;

/// An expression.
///
/// WGSL operators are non-associative across precedence groups: a
/// logical chain holds only `&&` or only `||`, a bitwise chain holds a
/// single operator, and a relational expression compares exactly two
/// operands. Mixing requires parentheses, which are kept as
/// [`Expression::Paren`] nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal.
    Literal(Literal),
    /// An identifier, optionally with a template list.
    Ident(TemplateElaboratedIdent),
    /// A function or value constructor call.
    Call(CallExpr),
    /// A parenthesized expression.
    Paren(ParenExpr),
    /// A unary expression.
    Unary(UnaryExpr),
    /// An index expression (e.g. `a[i]`).
    Index(IndexExpr),
    /// A member or swizzle access (e.g. `a.b`).
    Member(MemberExpr),
    /// A multiplicative, additive, or shift expression.
    Binary(BinaryExpr),
    /// A comparison.
    Relational(RelationalExpr),
    /// A chain of `&&` or of `||` operands.
    Logical(ChainExpr<LogicalOperator>),
    /// A chain of `&`, of `|`, or of `^` operands.
    Bitwise(ChainExpr<BitwiseOperator>),
}

impl Expression {
    /// Gets the span of the expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Call(e) => e.span,
            Self::Paren(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Index(e) => e.span,
            Self::Member(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Relational(e) => e.span,
            Self::Logical(e) => e.span,
            Self::Bitwise(e) => e.span,
        }
    }

    /// Gets the identifier of a plain identifier expression (one without a
    /// template list).
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Self::Ident(e) if e.template.is_none() => Some(&e.ident),
            _ => None,
        }
    }
}

/// The base of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberBase {
    /// A decimal literal.
    Decimal,
    /// A hexadecimal literal (`0x` prefix).
    Hex,
}

/// An integer literal suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntSuffix {
    /// The `i` suffix (`i32`).
    I,
    /// The `u` suffix (`u32`).
    U,
}

/// A floating point literal suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatSuffix {
    /// The `f` suffix (`f32`).
    F,
    /// The `h` suffix (`f16`).
    H,
}

/// The classification of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// A `true` or `false` literal.
    Bool(bool),
    /// An integer literal.
    Int {
        /// The base of the literal.
        base: NumberBase,
        /// The suffix of the literal; unsuffixed literals are abstract.
        suffix: Option<IntSuffix>,
    },
    /// A floating point literal.
    Float {
        /// The base of the literal.
        base: NumberBase,
        /// The suffix of the literal; unsuffixed literals are abstract.
        suffix: Option<FloatSuffix>,
    },
    /// A numeric literal the lexer could not read (e.g. `08` or `0x`).
    ///
    /// The lexer has already reported it.
    Invalid,
}

impl LiteralKind {
    /// Classifies a literal token.
    ///
    /// Returns `None` if the token is not a literal.
    pub fn classify(token: Token, text: &str) -> Option<Self> {
        let last = text.bytes().last();
        let kind = match token {
            Token::TrueKeyword => Self::Bool(true),
            Token::FalseKeyword => Self::Bool(false),
            Token::DecimalIntLiteral | Token::HexIntLiteral => Self::Int {
                base: if token == Token::HexIntLiteral {
                    NumberBase::Hex
                } else {
                    NumberBase::Decimal
                },
                suffix: match last {
                    Some(b'i') => Some(IntSuffix::I),
                    Some(b'u') => Some(IntSuffix::U),
                    _ => None,
                },
            },
            Token::DecimalFloatLiteral => Self::Float {
                base: NumberBase::Decimal,
                suffix: float_suffix(last),
            },
            Token::HexFloatLiteral => Self::Float {
                base: NumberBase::Hex,
                // `f` is a hex digit, so a suffix requires an exponent
                suffix: if text.contains(['p', 'P']) {
                    float_suffix(last)
                } else {
                    None
                },
            },
            Token::MalformedNumber => Self::Invalid,
            _ => return None,
        };

        Some(kind)
    }
}

/// Gets the float suffix for the last byte of a float literal.
fn float_suffix(last: Option<u8>) -> Option<FloatSuffix> {
    match last {
        Some(b'f') => Some(FloatSuffix::F),
        Some(b'h') => Some(FloatSuffix::H),
        _ => None,
    }
}

/// A literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The classification of the literal.
    pub kind: LiteralKind,
    /// The source text of the literal.
    pub text: String,
    /// The span of the literal.
    pub span: Span,
}

/// A call expression.
///
/// Type constructors (e.g. `vec4<f32>(1.0)`) are calls too.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// The function or type being called.
    pub callee: TemplateElaboratedIdent,
    /// The arguments of the call.
    pub args: Vec<Expression>,
    /// The span of the call.
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    /// The inner expression.
    pub inner: Box<Expression>,
    /// The span of the expression, including the parentheses.
    pub span: Span,
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `!`
    Not,
    /// `~`
    Complement,
    /// `*`
    Indirection,
    /// `&`
    AddressOf,
}

impl UnaryOperator {
    /// Gets the operator for the given token.
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Minus => Some(Self::Negate),
            Token::Bang => Some(Self::Not),
            Token::Tilde => Some(Self::Complement),
            Token::Star => Some(Self::Indirection),
            Token::And => Some(Self::AddressOf),
            _ => None,
        }
    }

    /// Gets the source text of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::Complement => "~",
            Self::Indirection => "*",
            Self::AddressOf => "&",
        }
    }
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    /// The operator.
    pub op: UnaryOperator,
    /// The operand.
    pub operand: Box<Expression>,
    /// The span of the expression.
    pub span: Span,
}

/// An index expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    /// The indexed expression.
    pub base: Box<Expression>,
    /// The index.
    pub index: Box<Expression>,
    /// The span of the expression.
    pub span: Span,
}

/// A member access expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    /// The accessed expression.
    pub base: Box<Expression>,
    /// The member name.
    pub member: Ident,
    /// The span of the expression.
    pub span: Span,
}

impl MemberExpr {
    /// Determines if the member name is shaped like a vector swizzle.
    ///
    /// A swizzle is one to four components drawn entirely from `rgba` or
    /// entirely from `xyzw`. Whether it is a swizzle or a struct member
    /// depends on the type of the base, which is not known to the parser.
    pub fn is_swizzle(&self) -> bool {
        let name = self.member.as_str();
        (1..=4).contains(&name.len())
            && (name.bytes().all(|b| b"rgba".contains(&b))
                || name.bytes().all(|b| b"xyzw".contains(&b)))
    }
}

/// A multiplicative, additive, or shift operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Remainder,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
}

impl BinaryOperator {
    /// Gets the multiplicative operator for the given token.
    pub fn multiplicative(token: Token) -> Option<Self> {
        match token {
            Token::Star => Some(Self::Multiply),
            Token::Slash => Some(Self::Divide),
            Token::Percent => Some(Self::Remainder),
            _ => None,
        }
    }

    /// Gets the additive operator for the given token.
    pub fn additive(token: Token) -> Option<Self> {
        match token {
            Token::Plus => Some(Self::Add),
            Token::Minus => Some(Self::Subtract),
            _ => None,
        }
    }

    /// Gets the shift operator for the given token.
    pub fn shift(token: Token) -> Option<Self> {
        match token {
            Token::ShiftLeft => Some(Self::ShiftLeft),
            Token::ShiftRight => Some(Self::ShiftRight),
            _ => None,
        }
    }

    /// Gets the source text of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
        }
    }
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// The operator.
    pub op: BinaryOperator,
    /// The left-hand side.
    pub lhs: Box<Expression>,
    /// The right-hand side.
    pub rhs: Box<Expression>,
    /// The span of the expression.
    pub span: Span,
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOperator {
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl RelationalOperator {
    /// Gets the operator for the given token.
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Less => Some(Self::Less),
            Token::Greater => Some(Self::Greater),
            Token::LessEqual => Some(Self::LessEqual),
            Token::GreaterEqual => Some(Self::GreaterEqual),
            Token::Equal => Some(Self::Equal),
            Token::NotEqual => Some(Self::NotEqual),
            _ => None,
        }
    }

    /// Gets the source text of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

/// A comparison of two operands.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalExpr {
    /// The operator.
    pub op: RelationalOperator,
    /// The left-hand side.
    pub lhs: Box<Expression>,
    /// The right-hand side.
    pub rhs: Box<Expression>,
    /// The span of the expression.
    pub span: Span,
}

/// A short-circuiting operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// A bitwise operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseOperator {
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
}

/// An operator that may be chained with itself.
pub trait ChainOperator: Copy {
    /// Gets the operator for the given token.
    fn from_token(token: Token) -> Option<Self>;

    /// Gets the source text of the operator.
    fn as_str(&self) -> &'static str;
}

impl ChainOperator for LogicalOperator {
    fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::AndAnd => Some(Self::And),
            Token::OrOr => Some(Self::Or),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl ChainOperator for BitwiseOperator {
    fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::And => Some(Self::And),
            Token::Or => Some(Self::Or),
            Token::Xor => Some(Self::Xor),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
        }
    }
}

/// A chain of operands joined by a single repeated operator.
///
/// The chain is evaluated left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainExpr<Op> {
    /// The operator joining every operand.
    pub op: Op,
    /// The operands; there are always at least two.
    pub operands: Vec<Expression>,
    /// The span of the expression.
    pub span: Span,
}
