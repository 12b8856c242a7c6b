//! Attribute and diagnostic control nodes.

use std::fmt;

use super::Expression;
use super::Ident;
use crate::Span;

/// An attribute (e.g. `@location(0)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The kind of the attribute.
    pub kind: AttributeKind,
    /// The span of the attribute, including the `@`.
    pub span: Span,
}

impl Attribute {
    /// Gets the name of the attribute, without the `@`.
    pub fn name(&self) -> &str {
        match &self.kind {
            AttributeKind::Align(_) => "align",
            AttributeKind::Binding(_) => "binding",
            AttributeKind::BlendSrc(_) => "blend_src",
            AttributeKind::Builtin(_) => "builtin",
            AttributeKind::Const => "const",
            AttributeKind::Diagnostic(_) => "diagnostic",
            AttributeKind::Group(_) => "group",
            AttributeKind::Id(_) => "id",
            AttributeKind::Interpolate { .. } => "interpolate",
            AttributeKind::Invariant => "invariant",
            AttributeKind::Location(_) => "location",
            AttributeKind::MustUse => "must_use",
            AttributeKind::Size(_) => "size",
            AttributeKind::WorkgroupSize { .. } => "workgroup_size",
            AttributeKind::Vertex => "vertex",
            AttributeKind::Fragment => "fragment",
            AttributeKind::Compute => "compute",
            AttributeKind::Other { name, .. } => name.as_str(),
        }
    }
}

/// The kind of an attribute.
///
/// Attributes are parsed generically as `@name` or `@name(args...)` and then
/// specialized by name; names that are not known become
/// [`AttributeKind::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// `@align(e)`
    Align(Expression),
    /// `@binding(e)`
    Binding(Expression),
    /// `@blend_src(e)`
    BlendSrc(Expression),
    /// `@builtin(name)`
    Builtin(Expression),
    /// `@const`
    Const,
    /// `@diagnostic(severity, rule)`
    Diagnostic(DiagnosticControl),
    /// `@group(e)`
    Group(Expression),
    /// `@id(e)`
    Id(Expression),
    /// `@interpolate(type)` or `@interpolate(type, sampling)`
    Interpolate {
        /// The interpolation type.
        ty: Expression,
        /// The interpolation sampling.
        sampling: Option<Expression>,
    },
    /// `@invariant`
    Invariant,
    /// `@location(e)`
    Location(Expression),
    /// `@must_use`
    MustUse,
    /// `@size(e)`
    Size(Expression),
    /// `@workgroup_size(x)`, `@workgroup_size(x, y)`, or
    /// `@workgroup_size(x, y, z)`
    WorkgroupSize {
        /// The x dimension.
        x: Expression,
        /// The y dimension.
        y: Option<Expression>,
        /// The z dimension.
        z: Option<Expression>,
    },
    /// `@vertex`
    Vertex,
    /// `@fragment`
    Fragment,
    /// `@compute`
    Compute,
    /// Any other attribute.
    Other {
        /// The name of the attribute.
        name: Ident,
        /// The arguments, if the attribute had a parenthesized list.
        args: Option<Vec<Expression>>,
    },
}

/// A diagnostic severity control name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// `error`
    Error,
    /// `warning`
    Warning,
    /// `info`
    Info,
    /// `off`
    Off,
}

impl DiagnosticSeverity {
    /// Parses a severity control name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    /// Gets the name of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Off => "off",
        }
    }
}

/// A diagnostic rule name, which is either a single identifier or two
/// identifiers joined by `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRuleName {
    /// The first (or only) identifier.
    pub name: Ident,
    /// The identifier following the `.`, if any.
    pub member: Option<Ident>,
}

impl fmt::Display for DiagnosticRuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{name}.{member}", name = self.name),
            None => write!(f, "{name}", name = self.name),
        }
    }
}

/// A diagnostic control, as used by both the `diagnostic` directive and
/// the `@diagnostic` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticControl {
    /// The severity to apply.
    pub severity: DiagnosticSeverity,
    /// The rule the severity applies to.
    pub rule: DiagnosticRuleName,
    /// The span of the control, including the parentheses.
    pub span: Span,
}
