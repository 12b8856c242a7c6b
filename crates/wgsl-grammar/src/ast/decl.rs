//! Declaration nodes.

use super::Attribute;
use super::AttributeKind;
use super::CompoundStatement;
use super::Expression;
use super::Ident;
use super::TemplateList;
use super::TypeSpecifier;
use crate::Span;

/// A global declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalDecl {
    /// A stray `;`.
    Empty(Span),
    /// A module-scope `var` declaration.
    Variable(GlobalVariableDecl),
    /// A module-scope `const` declaration.
    Const(ValueDecl),
    /// An `override` declaration.
    Override(OverrideDecl),
    /// A type alias.
    Alias(AliasDecl),
    /// A struct declaration.
    Struct(StructDecl),
    /// A function declaration.
    Function(FunctionDecl),
    /// A `const_assert` declaration.
    ConstAssert(ConstAssert),
}

impl GlobalDecl {
    /// Gets the span of the declaration.
    pub fn span(&self) -> Span {
        match self {
            Self::Empty(span) => *span,
            Self::Variable(d) => d.span,
            Self::Const(d) => d.span,
            Self::Override(d) => d.span,
            Self::Alias(d) => d.span,
            Self::Struct(d) => d.span,
            Self::Function(d) => d.span,
            Self::ConstAssert(d) => d.span,
        }
    }

    /// Gets the declared name, if the declaration declares one.
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Self::Empty(_) | Self::ConstAssert(_) => None,
            Self::Variable(d) => Some(&d.var.name),
            Self::Const(d) => Some(&d.name),
            Self::Override(d) => Some(&d.name),
            Self::Alias(d) => Some(&d.name),
            Self::Struct(d) => Some(&d.name),
            Self::Function(d) => Some(&d.name),
        }
    }
}

/// A `var` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    /// The address space and access mode template list (e.g.
    /// `<storage, read_write>`).
    pub template: Option<TemplateList>,
    /// The name of the variable.
    pub name: Ident,
    /// The declared type.
    pub ty: Option<TypeSpecifier>,
    /// The initializer.
    pub initializer: Option<Expression>,
    /// The span of the declaration.
    pub span: Span,
}

/// A module-scope `var` declaration with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariableDecl {
    /// The attributes of the declaration.
    pub attributes: Vec<Attribute>,
    /// The variable declaration.
    pub var: VariableDecl,
    /// The span of the declaration, including the attributes.
    pub span: Span,
}

/// A `const` or `let` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDecl {
    /// The name of the value.
    pub name: Ident,
    /// The declared type.
    pub ty: Option<TypeSpecifier>,
    /// The initializer.
    pub initializer: Expression,
    /// The span of the declaration.
    pub span: Span,
}

/// An `override` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideDecl {
    /// The attributes of the declaration.
    pub attributes: Vec<Attribute>,
    /// The name of the override.
    pub name: Ident,
    /// The declared type.
    pub ty: Option<TypeSpecifier>,
    /// The default value.
    pub initializer: Option<Expression>,
    /// The span of the declaration.
    pub span: Span,
}

/// A type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    /// The name of the alias.
    pub name: Ident,
    /// The aliased type.
    pub ty: TypeSpecifier,
    /// The span of the declaration.
    pub span: Span,
}

/// A struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    /// The attributes of the declaration.
    pub attributes: Vec<Attribute>,
    /// The name of the struct.
    pub name: Ident,
    /// The members; there is always at least one.
    pub members: Vec<StructMember>,
    /// The span of the declaration.
    pub span: Span,
}

/// A struct member.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    /// The attributes of the member.
    pub attributes: Vec<Attribute>,
    /// The name of the member.
    pub name: Ident,
    /// The type of the member.
    pub ty: TypeSpecifier,
    /// The span of the member.
    pub span: Span,
}

/// A shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// A vertex shader.
    Vertex,
    /// A fragment shader.
    Fragment,
    /// A compute shader.
    Compute,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// The attributes of the function.
    pub attributes: Vec<Attribute>,
    /// The name of the function.
    pub name: Ident,
    /// The parameters of the function.
    pub params: Vec<Param>,
    /// The return type of the function.
    pub return_type: Option<ReturnType>,
    /// The body of the function.
    pub body: CompoundStatement,
    /// The span of the declaration.
    pub span: Span,
}

impl FunctionDecl {
    /// Gets the shader stage of the function if it is an entry point.
    pub fn stage(&self) -> Option<ShaderStage> {
        self.attributes.iter().find_map(|a| match a.kind {
            AttributeKind::Vertex => Some(ShaderStage::Vertex),
            AttributeKind::Fragment => Some(ShaderStage::Fragment),
            AttributeKind::Compute => Some(ShaderStage::Compute),
            _ => None,
        })
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The attributes of the parameter.
    pub attributes: Vec<Attribute>,
    /// The name of the parameter.
    pub name: Ident,
    /// The type of the parameter.
    pub ty: TypeSpecifier,
    /// The span of the parameter.
    pub span: Span,
}

/// A function return type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnType {
    /// The attributes of the return value.
    pub attributes: Vec<Attribute>,
    /// The returned type.
    pub ty: TypeSpecifier,
    /// The span of the return type, including the attributes.
    pub span: Span,
}

/// A `const_assert` declaration or statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstAssert {
    /// The asserted expression.
    pub condition: Expression,
    /// The span of the assertion.
    pub span: Span,
}
