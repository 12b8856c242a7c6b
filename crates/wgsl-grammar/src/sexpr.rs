//! A span-free s-expression rendering of the AST.
//!
//! The rendering is meant for debugging output and for comparing trees
//! structurally: two trees render identically exactly when they differ only
//! in spans and in source details the AST does not keep (comments,
//! whitespace, trailing commas, and optional punctuation).
//!
//! A translation unit renders one directive or declaration per line:
//!
//! ```text
//! (enable f16)
//! (const x (init (call (vec2 (template f32)) 1.0 2.0)))
//! (fn main (attributes (@compute) (@workgroup_size 8)) (block (return)))
//! ```

use crate::ast::AssignmentTarget;
use crate::ast::Attribute;
use crate::ast::AttributeKind;
use crate::ast::CallExpr;
use crate::ast::CaseSelector;
use crate::ast::ChainOperator;
use crate::ast::CompoundStatement;
use crate::ast::DiagnosticControl;
use crate::ast::Directive;
use crate::ast::Expression;
use crate::ast::GlobalDecl;
use crate::ast::Statement;
use crate::ast::SwitchClauseKind;
use crate::ast::TemplateElaboratedIdent;
use crate::ast::TemplateList;
use crate::ast::TranslationUnit;
use crate::ast::ValueDecl;
use crate::ast::VariableDecl;

/// Renders a list with the given head and items.
fn list(head: &str, items: impl IntoIterator<Item = String>) -> String {
    let mut out = format!("({head}");
    for item in items {
        out.push(' ');
        out.push_str(&item);
    }

    out.push(')');
    out
}

/// Renders a tagged single item, if present.
fn tagged(head: &str, item: Option<String>) -> Option<String> {
    item.map(|item| list(head, [item]))
}

/// Renders a non-empty attribute list.
fn attributes(head: &str, attributes: &[Attribute]) -> Option<String> {
    if attributes.is_empty() {
        return None;
    }

    Some(list(head, attributes.iter().map(attribute)))
}

/// Renders a diagnostic control as its severity and rule name.
fn control(control: &DiagnosticControl) -> [String; 2] {
    [
        control.severity.as_str().to_string(),
        control.rule.to_string(),
    ]
}

/// Renders an attribute.
pub fn attribute(attribute: &Attribute) -> String {
    let head = format!("@{name}", name = attribute.name());
    let args: Vec<String> = match &attribute.kind {
        AttributeKind::Align(e)
        | AttributeKind::Binding(e)
        | AttributeKind::BlendSrc(e)
        | AttributeKind::Builtin(e)
        | AttributeKind::Group(e)
        | AttributeKind::Id(e)
        | AttributeKind::Location(e)
        | AttributeKind::Size(e) => vec![expression(e)],
        AttributeKind::Const
        | AttributeKind::Invariant
        | AttributeKind::MustUse
        | AttributeKind::Vertex
        | AttributeKind::Fragment
        | AttributeKind::Compute => Vec::new(),
        AttributeKind::Diagnostic(c) => control(c).into(),
        AttributeKind::Interpolate { ty, sampling } => {
            [Some(ty), sampling.as_ref()].into_iter().flatten().map(expression).collect()
        }
        AttributeKind::WorkgroupSize { x, y, z } => [Some(x), y.as_ref(), z.as_ref()]
            .into_iter()
            .flatten()
            .map(expression)
            .collect(),
        AttributeKind::Other { args, .. } => {
            args.iter().flatten().map(expression).collect()
        }
    };

    list(&head, args)
}

/// Renders a template list.
fn template(template: &TemplateList) -> String {
    list("template", template.args.iter().map(expression))
}

/// Renders an identifier with an optional template list.
///
/// An identifier without a template list renders as just its name.
pub fn template_elaborated_ident(ident: &TemplateElaboratedIdent) -> String {
    match &ident.template {
        Some(t) => list(ident.ident.as_str(), [template(t)]),
        None => ident.ident.to_string(),
    }
}

/// Renders a function call.
fn call(call: &CallExpr) -> String {
    list(
        "call",
        std::iter::once(template_elaborated_ident(&call.callee))
            .chain(call.args.iter().map(expression)),
    )
}

/// Renders an expression.
pub fn expression(expr: &Expression) -> String {
    match expr {
        Expression::Literal(l) => l.text.clone(),
        Expression::Ident(i) => template_elaborated_ident(i),
        Expression::Call(c) => call(c),
        Expression::Paren(p) => list("paren", [expression(&p.inner)]),
        Expression::Unary(u) => list(u.op.as_str(), [expression(&u.operand)]),
        Expression::Index(i) => list("index", [expression(&i.base), expression(&i.index)]),
        Expression::Member(m) => list("member", [expression(&m.base), m.member.to_string()]),
        Expression::Binary(b) => list(b.op.as_str(), [expression(&b.lhs), expression(&b.rhs)]),
        Expression::Relational(r) => {
            list(r.op.as_str(), [expression(&r.lhs), expression(&r.rhs)])
        }
        Expression::Logical(c) => list(c.op.as_str(), c.operands.iter().map(expression)),
        Expression::Bitwise(c) => list(c.op.as_str(), c.operands.iter().map(expression)),
    }
}

/// Renders a `var` declaration.
fn variable(var: &VariableDecl, attrs: &[Attribute]) -> String {
    list(
        "var",
        [
            Some(var.name.to_string()),
            var.template.as_ref().map(template),
            tagged("type", var.ty.as_ref().map(template_elaborated_ident)),
            tagged("init", var.initializer.as_ref().map(expression)),
            attributes("attributes", attrs),
        ]
        .into_iter()
        .flatten(),
    )
}

/// Renders a `const` or `let` declaration.
fn value(head: &str, decl: &ValueDecl) -> String {
    list(
        head,
        [
            Some(decl.name.to_string()),
            tagged("type", decl.ty.as_ref().map(template_elaborated_ident)),
            Some(list("init", [expression(&decl.initializer)])),
        ]
        .into_iter()
        .flatten(),
    )
}

/// Renders a compound statement.
fn block(block: &CompoundStatement) -> String {
    list(
        "block",
        attributes("attributes", &block.attributes)
            .into_iter()
            .chain(block.statements.iter().map(statement)),
    )
}

/// Renders a statement.
pub fn statement(stmt: &Statement) -> String {
    match stmt {
        Statement::Empty(_) => "(empty)".to_string(),
        Statement::Compound(b) => block(b),
        Statement::Assignment(a) => list(
            a.op.as_str(),
            [
                match &a.target {
                    AssignmentTarget::Phony(_) => "_".to_string(),
                    AssignmentTarget::Expression(e) => expression(e),
                },
                expression(&a.value),
            ],
        ),
        Statement::Increment(u) => list("++", [expression(&u.target)]),
        Statement::Decrement(u) => list("--", [expression(&u.target)]),
        Statement::Call(c) => call(c),
        Statement::If(s) => list(
            "if",
            attributes("attributes", &s.attributes)
                .into_iter()
                .chain([expression(&s.condition), block(&s.body)])
                .chain(s.else_ifs.iter().map(|clause| {
                    list("else-if", [expression(&clause.condition), block(&clause.body)])
                }))
                .chain(tagged("else", s.else_body.as_ref().map(block))),
        ),
        Statement::Switch(s) => list(
            "switch",
            attributes("attributes", &s.attributes)
                .into_iter()
                .chain([expression(&s.selector)])
                .chain(attributes("body-attributes", &s.body_attributes))
                .chain(s.clauses.iter().map(|clause| match &clause.kind {
                    SwitchClauseKind::Case(selectors) => list(
                        "case",
                        [
                            list(
                                "selectors",
                                selectors.iter().map(|s| match s {
                                    CaseSelector::Default(_) => "default".to_string(),
                                    CaseSelector::Expression(e) => expression(e),
                                }),
                            ),
                            block(&clause.body),
                        ],
                    ),
                    SwitchClauseKind::Default => list("default", [block(&clause.body)]),
                })),
        ),
        Statement::Loop(s) => list(
            "loop",
            attributes("attributes", &s.attributes)
                .into_iter()
                .chain(attributes("body-attributes", &s.body_attributes))
                .chain(s.statements.iter().map(statement))
                .chain(s.continuing.as_ref().map(|c| {
                    list(
                        "continuing",
                        attributes("attributes", &c.attributes)
                            .into_iter()
                            .chain(c.statements.iter().map(statement)),
                    )
                })),
        ),
        Statement::For(s) => list(
            "for",
            [
                attributes("attributes", &s.attributes),
                tagged("init", s.init.as_deref().map(statement)),
                tagged("condition", s.condition.as_ref().map(expression)),
                tagged("update", s.update.as_deref().map(statement)),
                Some(block(&s.body)),
            ]
            .into_iter()
            .flatten(),
        ),
        Statement::While(s) => list(
            "while",
            attributes("attributes", &s.attributes)
                .into_iter()
                .chain([expression(&s.condition), block(&s.body)]),
        ),
        Statement::Break(_) => "(break)".to_string(),
        Statement::BreakIf(s) => list("break-if", [expression(&s.condition)]),
        Statement::Continue(_) => "(continue)".to_string(),
        Statement::Return(s) => list("return", s.value.as_ref().map(expression)),
        Statement::Discard(_) => "(discard)".to_string(),
        Statement::Var(v) => variable(v, &[]),
        Statement::Let(d) => value("let", d),
        Statement::Const(d) => value("const", d),
        Statement::ConstAssert(a) => list("const_assert", [expression(&a.condition)]),
    }
}

/// Renders a global directive.
pub fn directive(directive: &Directive) -> String {
    match directive {
        Directive::Diagnostic(d) => list("diagnostic", control(&d.control)),
        Directive::Enable(d) => list("enable", d.extensions.iter().map(ToString::to_string)),
        Directive::Requires(d) => list("requires", d.extensions.iter().map(ToString::to_string)),
    }
}

/// Renders a global declaration.
pub fn global_decl(decl: &GlobalDecl) -> String {
    match decl {
        GlobalDecl::Empty(_) => "(empty)".to_string(),
        GlobalDecl::Variable(v) => variable(&v.var, &v.attributes),
        GlobalDecl::Const(d) => value("const", d),
        GlobalDecl::Override(d) => list(
            "override",
            [
                Some(d.name.to_string()),
                tagged("type", d.ty.as_ref().map(template_elaborated_ident)),
                tagged("init", d.initializer.as_ref().map(expression)),
                attributes("attributes", &d.attributes),
            ]
            .into_iter()
            .flatten(),
        ),
        GlobalDecl::Alias(d) => list(
            "alias",
            [d.name.to_string(), template_elaborated_ident(&d.ty)],
        ),
        GlobalDecl::Struct(s) => list(
            "struct",
            std::iter::once(s.name.to_string())
                .chain(attributes("attributes", &s.attributes))
                .chain(s.members.iter().map(|m| {
                    list(
                        "member",
                        [m.name.to_string(), template_elaborated_ident(&m.ty)]
                            .into_iter()
                            .chain(attributes("attributes", &m.attributes)),
                    )
                })),
        ),
        GlobalDecl::Function(f) => list(
            "fn",
            std::iter::once(f.name.to_string())
                .chain(attributes("attributes", &f.attributes))
                .chain(f.params.iter().map(|p| {
                    list(
                        "param",
                        [p.name.to_string(), template_elaborated_ident(&p.ty)]
                            .into_iter()
                            .chain(attributes("attributes", &p.attributes)),
                    )
                }))
                .chain(f.return_type.as_ref().map(|r| {
                    list(
                        "returns",
                        std::iter::once(template_elaborated_ident(&r.ty))
                            .chain(attributes("attributes", &r.attributes)),
                    )
                }))
                .chain([block(&f.body)]),
        ),
        GlobalDecl::ConstAssert(a) => list("const_assert", [expression(&a.condition)]),
    }
}

/// Renders a translation unit, one directive or declaration per line.
pub fn translation_unit(unit: &TranslationUnit) -> String {
    let mut out = String::new();
    for line in unit
        .directives
        .iter()
        .map(directive)
        .chain(unit.declarations.iter().map(global_decl))
    {
        out.push_str(&line);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse;

    /// Parses the source and renders its translation unit.
    fn render(source: &str) -> String {
        let (unit, diagnostics) = parse(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        translation_unit(&unit.expect("should have a translation unit"))
    }

    #[test]
    fn declarations() {
        assert_eq!(
            render(
                "enable f16;\n@group(0) @binding(1) var<storage, read> data: array<f32>;\nalias \
                 v = vec2<f32>;\nstruct S { @location(0) a: f32, b: i32 }"
            ),
            "(enable f16)\n(var data (template storage read) (type (array (template f32))) \
             (attributes (@group 0) (@binding 1)))\n(alias v (vec2 (template f32)))\n(struct S \
             (member a f32 (attributes (@location 0))) (member b i32))\n"
        );
    }

    #[test]
    fn functions() {
        assert_eq!(
            render("@fragment fn main(@location(0) c: vec4f) -> @location(0) vec4f { return c; }"),
            "(fn main (attributes (@fragment)) (param c vec4f (attributes (@location 0))) \
             (returns vec4f (attributes (@location 0))) (block (return c)))\n"
        );
    }

    #[test]
    fn statements() {
        assert_eq!(
            render(
                "fn f() { var i = 0; for (; i < 4; i++) { if i == 2 { continue; } else { _ = i; \
                 } } loop { continuing { break if true; } } }"
            ),
            "(fn f (block (var i (init 0)) (for (condition (< i 4)) (update (++ i)) (block (if \
             (== i 2) (block (continue)) (else (block (= _ i)))))) (loop (continuing (break-if \
             true)))))\n"
        );
    }

    #[test]
    fn switch() {
        assert_eq!(
            render("fn f(x: i32) { switch x { case 1, default: {} default { discard; } } }"),
            "(fn f (param x i32) (block (switch x (case (selectors 1 default) (block)) (default \
             (block (discard))))))\n"
        );
    }
}
