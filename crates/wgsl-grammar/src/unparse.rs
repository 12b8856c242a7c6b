//! Serialization of the AST back to tokens and source text.
//!
//! The serialized tokens are separated by single spaces; every operator that
//! the lexer would split (e.g. `>=` and `>>`) is written as one run of
//! characters so that re-parsing the text rediscovers the same template
//! lists and produces a structurally identical tree.

use std::borrow::Cow;

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
use crate::ast::Ident;
use crate::ast::Statement;
use crate::ast::SwitchClauseKind;
use crate::ast::TemplateElaboratedIdent;
use crate::ast::TranslationUnit;
use crate::ast::TypeSpecifier;
use crate::ast::ValueDecl;
use crate::ast::VariableDecl;

/// Accumulates the tokens of AST nodes.
#[derive(Debug, Default)]
struct Unparser<'a> {
    /// The tokens written so far.
    tokens: Vec<Cow<'a, str>>,
}

impl<'a> Unparser<'a> {
    /// Writes a single token.
    fn push(&mut self, token: impl Into<Cow<'a, str>>) {
        self.tokens.push(token.into());
    }

    /// Writes an identifier.
    fn ident(&mut self, ident: &'a Ident) {
        self.push(ident.as_str());
    }

    /// Writes a list of items separated by commas.
    fn separated<T>(&mut self, items: &'a [T], mut f: impl FnMut(&mut Self, &'a T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(",");
            }

            f(self, item);
        }
    }

    /// Writes a parenthesized list of expressions.
    fn args(&mut self, args: &'a [Expression]) {
        self.push("(");
        self.separated(args, Self::expression);
        self.push(")");
    }

    /// Writes the `(severity, rule)` of a diagnostic directive or attribute.
    fn control(&mut self, control: &'a DiagnosticControl) {
        self.push("(");
        self.push(control.severity.as_str());
        self.push(",");
        self.ident(&control.rule.name);
        if let Some(member) = &control.rule.member {
            self.push(".");
            self.ident(member);
        }
        self.push(")");
    }

    /// Writes attributes, each as `@`, its name, and its arguments.
    fn attributes(&mut self, attributes: &'a [Attribute]) {
        for attribute in attributes {
            self.push("@");
            self.push(attribute.name());
            match &attribute.kind {
                AttributeKind::Align(e)
                | AttributeKind::Binding(e)
                | AttributeKind::BlendSrc(e)
                | AttributeKind::Builtin(e)
                | AttributeKind::Group(e)
                | AttributeKind::Id(e)
                | AttributeKind::Location(e)
                | AttributeKind::Size(e) => self.args(std::slice::from_ref(e)),
                AttributeKind::Const
                | AttributeKind::Invariant
                | AttributeKind::MustUse
                | AttributeKind::Vertex
                | AttributeKind::Fragment
                | AttributeKind::Compute => {}
                AttributeKind::Diagnostic(control) => self.control(control),
                AttributeKind::Interpolate { ty, sampling } => {
                    self.push("(");
                    self.expression(ty);
                    if let Some(sampling) = sampling {
                        self.push(",");
                        self.expression(sampling);
                    }
                    self.push(")");
                }
                AttributeKind::WorkgroupSize { x, y, z } => {
                    self.push("(");
                    self.expression(x);
                    for e in [y, z].into_iter().flatten() {
                        self.push(",");
                        self.expression(e);
                    }
                    self.push(")");
                }
                AttributeKind::Other { args, .. } => {
                    if let Some(args) = args {
                        self.args(args);
                    }
                }
            }
        }
    }

    /// Writes an identifier and its template list, if any.
    fn template_elaborated_ident(&mut self, ident: &'a TemplateElaboratedIdent) {
        self.ident(&ident.ident);
        if let Some(template) = &ident.template {
            self.push("<");
            self.separated(&template.args, Self::expression);
            self.push(">");
        }
    }

    /// Writes a call expression.
    fn call(&mut self, call: &'a CallExpr) {
        self.template_elaborated_ident(&call.callee);
        self.args(&call.args);
    }

    /// Writes an expression.
    fn expression(&mut self, expr: &'a Expression) {
        match expr {
            Expression::Literal(l) => self.push(l.text.as_str()),
            Expression::Ident(i) => self.template_elaborated_ident(i),
            Expression::Call(c) => self.call(c),
            Expression::Paren(p) => {
                self.push("(");
                self.expression(&p.inner);
                self.push(")");
            }
            Expression::Unary(u) => {
                self.push(u.op.as_str());
                self.expression(&u.operand);
            }
            Expression::Index(i) => {
                self.expression(&i.base);
                self.push("[");
                self.expression(&i.index);
                self.push("]");
            }
            Expression::Member(m) => {
                self.expression(&m.base);
                self.push(".");
                self.ident(&m.member);
            }
            Expression::Binary(b) => {
                self.expression(&b.lhs);
                self.push(b.op.as_str());
                self.expression(&b.rhs);
            }
            Expression::Relational(r) => {
                self.expression(&r.lhs);
                self.push(r.op.as_str());
                self.expression(&r.rhs);
            }
            Expression::Logical(c) => self.chain(c.op.as_str(), &c.operands),
            Expression::Bitwise(c) => self.chain(c.op.as_str(), &c.operands),
        }
    }

    /// Writes the operands of a chain separated by its operator.
    fn chain(&mut self, op: &'static str, operands: &'a [Expression]) {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                self.push(op);
            }

            self.expression(operand);
        }
    }

    /// Writes an optional `: type` annotation.
    fn annotation(&mut self, ty: Option<&'a TypeSpecifier>) {
        if let Some(ty) = ty {
            self.push(":");
            self.template_elaborated_ident(ty);
        }
    }

    /// Writes a `var` declaration without its terminator.
    fn variable(&mut self, var: &'a VariableDecl) {
        self.push("var");
        if let Some(template) = &var.template {
            self.push("<");
            self.separated(&template.args, Self::expression);
            self.push(">");
        }
        self.ident(&var.name);
        self.annotation(var.ty.as_ref());
        if let Some(init) = &var.initializer {
            self.push("=");
            self.expression(init);
        }
    }

    /// Writes a `const` or `let` declaration without its terminator.
    fn value(&mut self, keyword: &'static str, decl: &'a ValueDecl) {
        self.push(keyword);
        self.ident(&decl.name);
        self.annotation(decl.ty.as_ref());
        self.push("=");
        self.expression(&decl.initializer);
    }

    /// Writes a compound statement along with its attributes.
    fn block(&mut self, block: &'a CompoundStatement) {
        self.attributes(&block.attributes);
        self.push("{");
        for statement in &block.statements {
            self.statement(statement);
        }
        self.push("}");
    }

    /// Writes a statement that is terminated by `;`, without the `;`.
    ///
    /// These are the statements that may appear in a `for` header.
    fn simple_statement(&mut self, stmt: &'a Statement) {
        match stmt {
            Statement::Empty(_) => {}
            Statement::Assignment(a) => {
                match &a.target {
                    AssignmentTarget::Phony(_) => self.push("_"),
                    AssignmentTarget::Expression(e) => self.expression(e),
                }
                self.push(a.op.as_str());
                self.expression(&a.value);
            }
            Statement::Increment(u) => {
                self.expression(&u.target);
                self.push("++");
            }
            Statement::Decrement(u) => {
                self.expression(&u.target);
                self.push("--");
            }
            Statement::Call(c) => self.call(c),
            Statement::Break(_) => self.push("break"),
            Statement::BreakIf(s) => {
                self.push("break");
                self.push("if");
                self.expression(&s.condition);
            }
            Statement::Continue(_) => self.push("continue"),
            Statement::Return(s) => {
                self.push("return");
                if let Some(value) = &s.value {
                    self.expression(value);
                }
            }
            Statement::Discard(_) => self.push("discard"),
            Statement::Var(v) => self.variable(v),
            Statement::Let(d) => self.value("let", d),
            Statement::Const(d) => self.value("const", d),
            Statement::ConstAssert(a) => {
                self.push("const_assert");
                self.expression(&a.condition);
            }
            Statement::Compound(_)
            | Statement::If(_)
            | Statement::Switch(_)
            | Statement::Loop(_)
            | Statement::For(_)
            | Statement::While(_) => self.statement(stmt),
        }
    }

    /// Writes a statement.
    fn statement(&mut self, stmt: &'a Statement) {
        match stmt {
            Statement::Compound(b) => self.block(b),
            Statement::If(s) => {
                self.attributes(&s.attributes);
                self.push("if");
                self.expression(&s.condition);
                self.block(&s.body);
                for clause in &s.else_ifs {
                    self.push("else");
                    self.push("if");
                    self.expression(&clause.condition);
                    self.block(&clause.body);
                }
                if let Some(body) = &s.else_body {
                    self.push("else");
                    self.block(body);
                }
            }
            Statement::Switch(s) => {
                self.attributes(&s.attributes);
                self.push("switch");
                self.expression(&s.selector);
                self.attributes(&s.body_attributes);
                self.push("{");
                for clause in &s.clauses {
                    match &clause.kind {
                        SwitchClauseKind::Case(selectors) => {
                            self.push("case");
                            self.separated(selectors, |this, selector| match selector {
                                CaseSelector::Default(_) => this.push("default"),
                                CaseSelector::Expression(e) => this.expression(e),
                            });
                        }
                        SwitchClauseKind::Default => self.push("default"),
                    }
                    self.push(":");
                    self.block(&clause.body);
                }
                self.push("}");
            }
            Statement::Loop(s) => {
                self.attributes(&s.attributes);
                self.push("loop");
                self.attributes(&s.body_attributes);
                self.push("{");
                for statement in &s.statements {
                    self.statement(statement);
                }
                if let Some(continuing) = &s.continuing {
                    self.push("continuing");
                    self.attributes(&continuing.attributes);
                    self.push("{");
                    for statement in &continuing.statements {
                        self.statement(statement);
                    }
                    self.push("}");
                }
                self.push("}");
            }
            Statement::For(s) => {
                self.attributes(&s.attributes);
                self.push("for");
                self.push("(");
                if let Some(init) = &s.init {
                    self.simple_statement(init);
                }
                self.push(";");
                if let Some(condition) = &s.condition {
                    self.expression(condition);
                }
                self.push(";");
                if let Some(update) = &s.update {
                    self.simple_statement(update);
                }
                self.push(")");
                self.block(&s.body);
            }
            Statement::While(s) => {
                self.attributes(&s.attributes);
                self.push("while");
                self.expression(&s.condition);
                self.block(&s.body);
            }
            _ => {
                self.simple_statement(stmt);
                self.push(";");
            }
        }
    }

    /// Writes a global directive.
    fn directive(&mut self, directive: &'a Directive) {
        match directive {
            Directive::Diagnostic(d) => {
                self.push("diagnostic");
                self.control(&d.control);
            }
            Directive::Enable(d) => {
                self.push("enable");
                self.separated(&d.extensions, Self::ident);
            }
            Directive::Requires(d) => {
                self.push("requires");
                self.separated(&d.extensions, Self::ident);
            }
        }
        self.push(";");
    }

    /// Writes a global declaration.
    fn global_decl(&mut self, decl: &'a GlobalDecl) {
        match decl {
            GlobalDecl::Empty(_) => self.push(";"),
            GlobalDecl::Variable(v) => {
                self.attributes(&v.attributes);
                self.variable(&v.var);
                self.push(";");
            }
            GlobalDecl::Const(d) => {
                self.value("const", d);
                self.push(";");
            }
            GlobalDecl::Override(d) => {
                self.attributes(&d.attributes);
                self.push("override");
                self.ident(&d.name);
                self.annotation(d.ty.as_ref());
                if let Some(init) = &d.initializer {
                    self.push("=");
                    self.expression(init);
                }
                self.push(";");
            }
            GlobalDecl::Alias(d) => {
                self.push("alias");
                self.ident(&d.name);
                self.push("=");
                self.template_elaborated_ident(&d.ty);
                self.push(";");
            }
            GlobalDecl::Struct(s) => {
                self.attributes(&s.attributes);
                self.push("struct");
                self.ident(&s.name);
                self.push("{");
                self.separated(&s.members, |this, member| {
                    this.attributes(&member.attributes);
                    this.ident(&member.name);
                    this.push(":");
                    this.template_elaborated_ident(&member.ty);
                });
                self.push("}");
            }
            GlobalDecl::Function(f) => {
                self.attributes(&f.attributes);
                self.push("fn");
                self.ident(&f.name);
                self.push("(");
                self.separated(&f.params, |this, param| {
                    this.attributes(&param.attributes);
                    this.ident(&param.name);
                    this.push(":");
                    this.template_elaborated_ident(&param.ty);
                });
                self.push(")");
                if let Some(ret) = &f.return_type {
                    self.push("->");
                    self.attributes(&ret.attributes);
                    self.template_elaborated_ident(&ret.ty);
                }
                self.block(&f.body);
            }
            GlobalDecl::ConstAssert(a) => {
                self.push("const_assert");
                self.expression(&a.condition);
                self.push(";");
            }
        }
    }
}

/// Serializes a translation unit to a sequence of tokens.
///
/// Template list delimiters are written as `<` and `>`.
pub fn tokens(unit: &TranslationUnit) -> Vec<Cow<'_, str>> {
    let mut unparser = Unparser::default();
    for directive in &unit.directives {
        unparser.directive(directive);
    }

    for decl in &unit.declarations {
        unparser.global_decl(decl);
    }

    unparser.tokens
}

/// Serializes a translation unit to source text.
///
/// Each directive and declaration is written on its own line with its
/// tokens separated by single spaces.
pub fn to_source(unit: &TranslationUnit) -> String {
    let mut source = String::new();
    let lines = unit
        .directives
        .iter()
        .map(|d| {
            let mut unparser = Unparser::default();
            unparser.directive(d);
            unparser.tokens
        })
        .chain(unit.declarations.iter().map(|d| {
            let mut unparser = Unparser::default();
            unparser.global_decl(d);
            unparser.tokens
        }));

    for tokens in lines {
        source.push_str(&tokens.join(" "));
        source.push('\n');
    }

    source
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse;
    use crate::sexpr;

    /// Parses the source, unparses it, and checks that parsing the result
    /// yields the same tree.
    fn round_trip(source: &str) -> String {
        let (unit, diagnostics) = parse(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        let unit = unit.expect("should have a translation unit");

        let text = to_source(&unit);
        let (reparsed, diagnostics) = parse(&text);
        assert!(
            diagnostics.is_empty(),
            "unexpected diagnostics for `{text}`: {diagnostics:?}"
        );
        assert_eq!(
            sexpr::translation_unit(&reparsed.expect("should have a translation unit")),
            sexpr::translation_unit(&unit)
        );
        text
    }

    #[test]
    fn tokens_of_templates() {
        let (unit, _) = parse("alias a = array<vec2<f32>, 4>;");
        let unit = unit.expect("should have a translation unit");
        assert_eq!(
            tokens(&unit),
            [
                "alias", "a", "=", "array", "<", "vec2", "<", "f32", ">", ",", "4", ">", ";"
            ]
        );
    }

    #[test]
    fn operators_keep_their_spelling() {
        assert_eq!(
            round_trip("const a = b >> 1u >= c;"),
            "const a = b >> 1u >= c ;\n"
        );
        assert_eq!(round_trip("const a = - -b;"), "const a = - - b ;\n");
        round_trip("fn f() { x >>= 2; y <<= z; *p = &q; }");
    }

    #[test]
    fn declarations() {
        round_trip(
            r#"
diagnostic(off, derivative_uniformity);
enable f16, clip_distances;
requires readonly_and_readwrite_storage_textures;

@group(0) @binding(0) var<uniform> u: Uniforms;
@id(1) override scale: f32 = 1.0;
const_assert 1 < 2;

struct Vertex {
    @builtin(position) position: vec4f,
    @location(0) @interpolate(perspective, center) color: vec4<f32>,
}

@compute @workgroup_size(8, 8, 1)
fn main(@builtin(global_invocation_id) id: vec3<u32>) -> @location(0) f32 {
    let m = mat2x2<f32>(1.0, 0.0, 0.0, 1.0);
    return m[0].x;
}
"#,
        );
    }

    #[test]
    fn statements() {
        round_trip(
            r#"
fn f(x: i32) {
    var<function> i: i32 = 0;
    loop {
        if i >= 4 { break; } else if i == 2 { i += 2; } else { i++; }
        continuing { i--; break if i > x; }
    }
    for (var j = 0; j < 2; j++) { _ = a<b, c>(j); }
    while i < (x << 2u) { i = i * 2; }
    switch x { case 1, 2: {} case default, 3 { discard; } }
    @diagnostic(off, chromium.unreachable_code) { return; }
}
"#,
        );
    }
}
