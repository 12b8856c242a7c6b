//! The WGSL abstract syntax tree.
//!
//! Every node owns its data and records the byte span of the source it was
//! parsed from. Nodes are plain data: they can be cloned, compared, and sent
//! across threads freely.

use std::fmt;

use crate::Diagnostic;
use crate::Span;

mod attribute;
mod decl;
mod expr;
mod stmt;

pub use attribute::*;
pub use decl::*;
pub use expr::*;
pub use stmt::*;

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    /// The text of the identifier.
    pub name: String,
    /// The span of the identifier.
    pub span: Span,
}

impl Ident {
    /// Creates a new identifier.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Gets the text of the identifier.
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A template list (e.g. the `<f32, 4>` of `array<f32, 4>`).
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateList {
    /// The template arguments; there is always at least one.
    pub args: Vec<Expression>,
    /// The span of the list, including the delimiters.
    pub span: Span,
}

/// An identifier with an optional template list.
///
/// Type specifiers are represented by this node as well.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElaboratedIdent {
    /// The identifier.
    pub ident: Ident,
    /// The template list following the identifier.
    pub template: Option<TemplateList>,
    /// The span of the identifier and template list.
    pub span: Span,
}

impl TemplateElaboratedIdent {
    /// Gets the template arguments, if any.
    pub fn template_args(&self) -> &[Expression] {
        self.template.as_ref().map(|t| t.args.as_slice()).unwrap_or(&[])
    }
}

/// A type specifier (e.g. `vec4<f32>`).
pub type TypeSpecifier = TemplateElaboratedIdent;

/// A global directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// A `diagnostic(severity, rule);` directive.
    Diagnostic(DiagnosticDirective),
    /// An `enable ext, ...;` directive.
    Enable(ExtensionDirective),
    /// A `requires ext, ...;` directive.
    Requires(ExtensionDirective),
}

impl Directive {
    /// Gets the span of the directive.
    pub fn span(&self) -> Span {
        match self {
            Self::Diagnostic(d) => d.span,
            Self::Enable(d) | Self::Requires(d) => d.span,
        }
    }
}

/// A global `diagnostic` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticDirective {
    /// The diagnostic control of the directive.
    pub control: DiagnosticControl,
    /// The span of the directive.
    pub span: Span,
}

/// An `enable` or `requires` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDirective {
    /// The names of the extensions; there is always at least one.
    pub extensions: Vec<Ident>,
    /// The span of the directive.
    pub span: Span,
}

/// A parsed WGSL translation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    /// The global directives, in source order.
    pub directives: Vec<Directive>,
    /// The global declarations, in source order.
    pub declarations: Vec<GlobalDecl>,
}

impl TranslationUnit {
    /// Parses a translation unit from the given source.
    ///
    /// This is equivalent to [`parse`](crate::parse).
    pub fn parse(source: &str) -> (Option<Self>, Vec<Diagnostic>) {
        crate::parse(source)
    }

    /// Determines if the translation unit has no directives and no
    /// declarations.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.declarations.is_empty()
    }

    /// Gets the function declarations of the translation unit.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|d| match d {
            GlobalDecl::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Gets the struct declarations of the translation unit.
    pub fn structs(&self) -> impl Iterator<Item = &StructDecl> {
        self.declarations.iter().filter_map(|d| match d {
            GlobalDecl::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Gets the functions that are shader entry points.
    pub fn entry_points(&self) -> impl Iterator<Item = (ShaderStage, &FunctionDecl)> {
        self.functions()
            .filter_map(|f| f.stage().map(|stage| (stage, f)))
    }

    /// Finds a global declaration by name.
    pub fn find(&self, name: &str) -> Option<&GlobalDecl> {
        self.declarations
            .iter()
            .find(|d| d.name().is_some_and(|n| n.as_str() == name))
    }
}
