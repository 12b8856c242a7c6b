//! Statement nodes.

use super::Attribute;
use super::CallExpr;
use super::ConstAssert;
use super::Expression;
use super::ValueDecl;
use super::VariableDecl;
use crate::Span;
use crate::lexer::Token;

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An empty statement (`;`).
    Empty(Span),
    /// A compound statement (`{ ... }`).
    Compound(CompoundStatement),
    /// An assignment or compound assignment.
    Assignment(AssignmentStatement),
    /// An increment (`x++`).
    Increment(UpdateStatement),
    /// A decrement (`x--`).
    Decrement(UpdateStatement),
    /// A function call statement.
    Call(CallExpr),
    /// An `if` statement.
    If(IfStatement),
    /// A `switch` statement.
    Switch(SwitchStatement),
    /// A `loop` statement.
    Loop(LoopStatement),
    /// A `for` statement.
    For(ForStatement),
    /// A `while` statement.
    While(WhileStatement),
    /// A `break` statement.
    Break(Span),
    /// A `break if` statement; only the last statement of a `continuing`
    /// block may be one.
    BreakIf(BreakIfStatement),
    /// A `continue` statement.
    Continue(Span),
    /// A `return` statement.
    Return(ReturnStatement),
    /// A `discard` statement.
    Discard(Span),
    /// A local `var` declaration.
    Var(VariableDecl),
    /// A local `let` declaration.
    Let(ValueDecl),
    /// A local `const` declaration.
    Const(ValueDecl),
    /// A `const_assert` statement.
    ConstAssert(ConstAssert),
}

impl Statement {
    /// Gets the span of the statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Empty(span) | Self::Break(span) | Self::Continue(span) | Self::Discard(span) => {
                *span
            }
            Self::Compound(s) => s.span,
            Self::Assignment(s) => s.span,
            Self::Increment(s) | Self::Decrement(s) => s.span,
            Self::Call(s) => s.span,
            Self::If(s) => s.span,
            Self::Switch(s) => s.span,
            Self::Loop(s) => s.span,
            Self::For(s) => s.span,
            Self::While(s) => s.span,
            Self::BreakIf(s) => s.span,
            Self::Return(s) => s.span,
            Self::Var(s) => s.span,
            Self::Let(s) | Self::Const(s) => s.span,
            Self::ConstAssert(s) => s.span,
        }
    }
}

/// A compound statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStatement {
    /// The attributes of the statement.
    pub attributes: Vec<Attribute>,
    /// The statements within the braces.
    pub statements: Vec<Statement>,
    /// The span of the statement.
    pub span: Span,
}

/// An assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Subtract,
    /// `*=`
    Multiply,
    /// `/=`
    Divide,
    /// `%=`
    Remainder,
    /// `&=`
    And,
    /// `|=`
    Or,
    /// `^=`
    Xor,
    /// `<<=`
    ShiftLeft,
    /// `>>=`
    ShiftRight,
}

impl AssignmentOperator {
    /// Gets the operator for the given token.
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Assignment => Some(Self::Assign),
            Token::PlusAssign => Some(Self::Add),
            Token::MinusAssign => Some(Self::Subtract),
            Token::StarAssign => Some(Self::Multiply),
            Token::SlashAssign => Some(Self::Divide),
            Token::PercentAssign => Some(Self::Remainder),
            Token::AndAssign => Some(Self::And),
            Token::OrAssign => Some(Self::Or),
            Token::XorAssign => Some(Self::Xor),
            Token::ShiftLeftAssign => Some(Self::ShiftLeft),
            Token::ShiftRightAssign => Some(Self::ShiftRight),
            _ => None,
        }
    }

    /// Gets the source text of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Subtract => "-=",
            Self::Multiply => "*=",
            Self::Divide => "/=",
            Self::Remainder => "%=",
            Self::And => "&=",
            Self::Or => "|=",
            Self::Xor => "^=",
            Self::ShiftLeft => "<<=",
            Self::ShiftRight => ">>=",
        }
    }
}

/// The target of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentTarget {
    /// The phony target `_`.
    Phony(Span),
    /// A reference expression.
    Expression(Expression),
}

/// An assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    /// The assigned location.
    pub target: AssignmentTarget,
    /// The assignment operator.
    pub op: AssignmentOperator,
    /// The assigned value.
    pub value: Expression,
    /// The span of the statement.
    pub span: Span,
}

/// An increment or decrement statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// The updated location.
    pub target: Expression,
    /// The span of the statement.
    pub span: Span,
}

/// An `if` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The attributes of the statement.
    pub attributes: Vec<Attribute>,
    /// The condition.
    pub condition: Expression,
    /// The body executed when the condition holds.
    pub body: CompoundStatement,
    /// The `else if` clauses, in order.
    pub else_ifs: Vec<ElseIfClause>,
    /// The final `else` body.
    pub else_body: Option<CompoundStatement>,
    /// The span of the statement.
    pub span: Span,
}

/// An `else if` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseIfClause {
    /// The condition.
    pub condition: Expression,
    /// The body.
    pub body: CompoundStatement,
    /// The span of the clause.
    pub span: Span,
}

/// A `switch` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// The attributes of the statement.
    pub attributes: Vec<Attribute>,
    /// The selector expression.
    pub selector: Expression,
    /// The attributes of the switch body.
    pub body_attributes: Vec<Attribute>,
    /// The clauses; there is always at least one.
    pub clauses: Vec<SwitchClause>,
    /// The span of the statement.
    pub span: Span,
}

/// A case selector.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseSelector {
    /// The `default` selector.
    Default(Span),
    /// An expression selector.
    Expression(Expression),
}

/// The kind of a switch clause.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchClauseKind {
    /// A `case` clause with its selectors.
    Case(Vec<CaseSelector>),
    /// A `default` clause.
    Default,
}

/// A switch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchClause {
    /// The kind of clause.
    pub kind: SwitchClauseKind,
    /// The body of the clause.
    pub body: CompoundStatement,
    /// The span of the clause.
    pub span: Span,
}

/// A `loop` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopStatement {
    /// The attributes of the statement.
    pub attributes: Vec<Attribute>,
    /// The attributes of the loop body.
    pub body_attributes: Vec<Attribute>,
    /// The statements of the loop body.
    pub statements: Vec<Statement>,
    /// The `continuing` block.
    pub continuing: Option<ContinuingStatement>,
    /// The span of the statement.
    pub span: Span,
}

/// A `continuing` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuingStatement {
    /// The attributes of the block.
    pub attributes: Vec<Attribute>,
    /// The statements of the block, possibly ending with a `break if`.
    pub statements: Vec<Statement>,
    /// The span of the block.
    pub span: Span,
}

/// A `for` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// The attributes of the statement.
    pub attributes: Vec<Attribute>,
    /// The initializer.
    pub init: Option<Box<Statement>>,
    /// The condition.
    pub condition: Option<Expression>,
    /// The update.
    pub update: Option<Box<Statement>>,
    /// The body.
    pub body: CompoundStatement,
    /// The span of the statement.
    pub span: Span,
}

/// A `while` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The attributes of the statement.
    pub attributes: Vec<Attribute>,
    /// The condition.
    pub condition: Expression,
    /// The body.
    pub body: CompoundStatement,
    /// The span of the statement.
    pub span: Span,
}

/// A `break if` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakIfStatement {
    /// The condition.
    pub condition: Expression,
    /// The span of the statement.
    pub span: Span,
}

/// A `return` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// The returned value.
    pub value: Option<Expression>,
    /// The span of the statement.
    pub span: Span,
}
