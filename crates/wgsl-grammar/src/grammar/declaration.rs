//! Grammar functions for global directives and declarations.

use super::attribute::attributes;
use super::attribute::diagnostic_control;
use super::expression::expression;
use super::expression::template_elaborated_ident;
use super::expression::template_list;
use super::ident;
use super::reject_attributes;
use super::statement::block;
use super::terminator;
use crate::Diagnostic;
use crate::Span;
use crate::ast::AliasDecl;
use crate::ast::Attribute;
use crate::ast::ConstAssert;
use crate::ast::DiagnosticDirective;
use crate::ast::Directive;
use crate::ast::ExtensionDirective;
use crate::ast::FunctionDecl;
use crate::ast::GlobalDecl;
use crate::ast::GlobalVariableDecl;
use crate::ast::OverrideDecl;
use crate::ast::Param;
use crate::ast::ReturnType;
use crate::ast::StructDecl;
use crate::ast::StructMember;
use crate::ast::TypeSpecifier;
use crate::ast::ValueDecl;
use crate::ast::VariableDecl;
use crate::lexer::Token;
use crate::lexer::TokenSet;
use crate::parser::Parser;
use crate::parser::expected_found;

/// The recovery set for struct members.
const STRUCT_MEMBER_RECOVERY_SET: TokenSet =
    TokenSet::new(&[Token::Ident as u8, Token::Attr as u8]);

/// The recovery set for function parameters.
const PARAM_RECOVERY_SET: TokenSet = STRUCT_MEMBER_RECOVERY_SET;

/// Parses a global directive.
///
/// # Panics
///
/// Panics if the next token does not start a directive.
pub(super) fn directive(parser: &mut Parser<'_>) -> Result<Directive, Diagnostic> {
    match parser.next() {
        Some((Token::DiagnosticKeyword, start)) => {
            let control = diagnostic_control(parser)?;
            terminator(parser);
            Ok(Directive::Diagnostic(DiagnosticDirective {
                control,
                span: parser.span_from(start),
            }))
        }
        Some((Token::EnableKeyword, start)) => {
            extension_directive(parser, start).map(Directive::Enable)
        }
        Some((Token::RequiresKeyword, start)) => {
            extension_directive(parser, start).map(Directive::Requires)
        }
        _ => panic!("parser is not at a directive"),
    }
}

/// Parses the extension list of an `enable` or `requires` directive.
fn extension_directive(
    parser: &mut Parser<'_>,
    start: Span,
) -> Result<ExtensionDirective, Diagnostic> {
    let mut extensions = vec![ident(parser, "extension name")?];
    while parser.next_if(Token::Comma) {
        if let Some((Token::Semicolon, _)) = parser.peek() {
            break;
        }

        extensions.push(ident(parser, "extension name")?);
    }

    terminator(parser);
    Ok(ExtensionDirective {
        extensions,
        span: parser.span_from(start),
    })
}

/// Parses a global declaration.
pub(super) fn global_decl(parser: &mut Parser<'_>) -> Result<GlobalDecl, Diagnostic> {
    let start = parser.span();
    let attributes = attributes(parser)?;

    match parser.peek() {
        Some((Token::Semicolon, span)) if attributes.is_empty() => {
            parser.next();
            Ok(GlobalDecl::Empty(span))
        }
        Some((Token::VarKeyword, _)) => {
            let var = variable_decl(parser)?;
            terminator(parser);
            Ok(GlobalDecl::Variable(GlobalVariableDecl {
                attributes,
                var,
                span: parser.span_from(start),
            }))
        }
        Some((Token::OverrideKeyword, _)) => {
            override_decl(parser, attributes, start).map(GlobalDecl::Override)
        }
        Some((Token::ConstKeyword, _)) => {
            reject_attributes(parser, &attributes, "constant declarations");
            let decl = value_decl(parser, Token::ConstKeyword)?;
            terminator(parser);
            Ok(GlobalDecl::Const(decl))
        }
        Some((Token::AliasKeyword, _)) => {
            reject_attributes(parser, &attributes, "type aliases");
            alias_decl(parser).map(GlobalDecl::Alias)
        }
        Some((Token::StructKeyword, _)) => {
            struct_decl(parser, attributes, start).map(GlobalDecl::Struct)
        }
        Some((Token::FnKeyword, _)) => {
            function_decl(parser, attributes, start).map(GlobalDecl::Function)
        }
        Some((Token::ConstAssertKeyword, _)) => {
            reject_attributes(parser, &attributes, "`const_assert` declarations");
            let assert = const_assert(parser)?;
            terminator(parser);
            Ok(GlobalDecl::ConstAssert(assert))
        }
        _ => {
            let (found, span) = parser.found();
            let expected = if attributes.is_empty() {
                "global declaration"
            } else {
                "declaration after attributes"
            };
            Err(expected_found(expected, found, span))
        }
    }
}

/// Parses an optional `: type` suffix.
fn optional_type(parser: &mut Parser<'_>) -> Result<Option<TypeSpecifier>, Diagnostic> {
    if parser.next_if(Token::Colon) {
        return template_elaborated_ident(parser, "type").map(Some);
    }

    Ok(None)
}

/// Parses a `var` declaration without its terminator.
pub(super) fn variable_decl(parser: &mut Parser<'_>) -> Result<VariableDecl, Diagnostic> {
    let start = parser.require(Token::VarKeyword);
    let template = match parser.peek() {
        Some((Token::TemplateArgsStart, _)) => Some(template_list(parser)?),
        _ => None,
    };

    let name = ident(parser, "variable name")?;
    let ty = optional_type(parser)?;
    let initializer = if parser.next_if(Token::Assignment) {
        Some(expression(parser)?)
    } else {
        None
    };

    Ok(VariableDecl {
        template,
        name,
        ty,
        initializer,
        span: parser.span_from(start),
    })
}

/// Parses a `const` or `let` declaration without its terminator.
pub(super) fn value_decl(parser: &mut Parser<'_>, keyword: Token) -> Result<ValueDecl, Diagnostic> {
    let start = parser.require(keyword);
    let name = ident(parser, "value name")?;
    let ty = optional_type(parser)?;
    parser.expect(Token::Assignment)?;
    let initializer = expression(parser)?;
    Ok(ValueDecl {
        name,
        ty,
        initializer,
        span: parser.span_from(start),
    })
}

/// Parses an `override` declaration.
fn override_decl(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<OverrideDecl, Diagnostic> {
    parser.require(Token::OverrideKeyword);
    let name = ident(parser, "override name")?;
    let ty = optional_type(parser)?;
    let initializer = if parser.next_if(Token::Assignment) {
        Some(expression(parser)?)
    } else {
        None
    };

    terminator(parser);
    Ok(OverrideDecl {
        attributes,
        name,
        ty,
        initializer,
        span: parser.span_from(start),
    })
}

/// Parses a type alias.
fn alias_decl(parser: &mut Parser<'_>) -> Result<AliasDecl, Diagnostic> {
    let start = parser.require(Token::AliasKeyword);
    let name = ident(parser, "alias name")?;
    parser.expect(Token::Assignment)?;
    let ty = template_elaborated_ident(parser, "type")?;
    terminator(parser);
    Ok(AliasDecl {
        name,
        ty,
        span: parser.span_from(start),
    })
}

/// Parses a `const_assert` without its terminator.
pub(super) fn const_assert(parser: &mut Parser<'_>) -> Result<ConstAssert, Diagnostic> {
    let start = parser.require(Token::ConstAssertKeyword);
    let condition = expression(parser)?;
    Ok(ConstAssert {
        condition,
        span: parser.span_from(start),
    })
}

/// Parses a struct declaration.
fn struct_decl(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<StructDecl, Diagnostic> {
    parser.require(Token::StructKeyword);
    let name = ident(parser, "struct name")?;
    let (members, body) = parser.matching_delimited(
        Token::OpenBrace,
        Token::CloseBrace,
        Some(Token::Comma),
        STRUCT_MEMBER_RECOVERY_SET,
        struct_member,
    )?;

    if members.is_empty() {
        parser.diagnostic(
            Diagnostic::error(format!("struct `{name}` must have at least one member"))
                .with_label("this struct body is empty", body),
        );
    }

    Ok(StructDecl {
        attributes,
        name,
        members,
        span: parser.span_from(start),
    })
}

/// Parses a struct member.
fn struct_member(parser: &mut Parser<'_>) -> Result<StructMember, Diagnostic> {
    let start = parser.span();
    let attributes = attributes(parser)?;
    let name = ident(parser, "member name")?;
    parser.expect(Token::Colon)?;
    let ty = template_elaborated_ident(parser, "type")?;
    Ok(StructMember {
        attributes,
        name,
        ty,
        span: parser.span_from(start),
    })
}

/// Parses a function declaration.
fn function_decl(
    parser: &mut Parser<'_>,
    attributes: Vec<Attribute>,
    start: Span,
) -> Result<FunctionDecl, Diagnostic> {
    parser.require(Token::FnKeyword);
    let name = ident(parser, "function name")?;
    let (params, _) = parser.matching_delimited(
        Token::OpenParen,
        Token::CloseParen,
        Some(Token::Comma),
        PARAM_RECOVERY_SET,
        param,
    )?;

    let return_type = match parser.peek() {
        Some((Token::Arrow, _)) => {
            parser.next();
            let start = parser.span();
            let return_attributes = super::attribute::attributes(parser)?;
            let ty = template_elaborated_ident(parser, "return type")?;
            Some(ReturnType {
                attributes: return_attributes,
                ty,
                span: parser.span_from(start),
            })
        }
        _ => None,
    };

    let body = block(parser)?;
    Ok(FunctionDecl {
        attributes,
        name,
        params,
        return_type,
        body,
        span: parser.span_from(start),
    })
}

/// Parses a function parameter.
fn param(parser: &mut Parser<'_>) -> Result<Param, Diagnostic> {
    let start = parser.span();
    let attributes = attributes(parser)?;
    let name = ident(parser, "parameter name")?;
    parser.expect(Token::Colon)?;
    let ty = template_elaborated_ident(parser, "parameter type")?;
    Ok(Param {
        attributes,
        name,
        ty,
        span: parser.span_from(start),
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::ast::Directive;
    use crate::ast::GlobalDecl;
    use crate::ast::ShaderStage;
    use crate::parse;

    #[test]
    fn global_declarations() {
        let source = r#"
enable f16, clip_distances,;
requires readonly_and_readwrite_storage_textures;
diagnostic(off, derivative_uniformity);

@group(0) @binding(1) var<storage, read_write> data: array<f32>;
override scale: f32 = 1.0;
const limit = 4u;
alias Color = vec4<f32>;
struct Light { @location(0) position: vec3<f32>, color: Color, }
const_assert limit > 2;

@vertex
fn vs(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0);
}
"#;
        let (unit, diagnostics) = parse(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let unit = unit.unwrap();
        assert_eq!(unit.directives.len(), 3);
        let Directive::Enable(enable) = &unit.directives[0] else {
            panic!("expected an enable directive");
        };
        assert_eq!(enable.extensions.len(), 2);

        let names: Vec<_> = unit
            .declarations
            .iter()
            .map(|d| d.name().map(|n| n.as_str().to_string()))
            .collect();
        assert_eq!(
            names,
            [
                Some("data".to_string()),
                Some("scale".to_string()),
                Some("limit".to_string()),
                Some("Color".to_string()),
                Some("Light".to_string()),
                None,
                Some("vs".to_string()),
            ]
        );

        let GlobalDecl::Variable(data) = &unit.declarations[0] else {
            panic!("expected a variable");
        };
        assert_eq!(data.attributes.len(), 2);
        assert_eq!(
            data.var.template.as_ref().map(|t| t.args.len()),
            Some(2)
        );

        let light = unit.structs().next().unwrap();
        assert_eq!(light.members.len(), 2);

        let (stage, vs) = unit.entry_points().next().unwrap();
        assert_eq!(stage, ShaderStage::Vertex);
        assert_eq!(vs.params.len(), 1);
        assert!(vs.return_type.is_some());
    }

    #[test]
    fn reserved_variable_name() {
        let (unit, diagnostics) = parse("var impl : i32;");
        assert!(unit.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "`impl` is a reserved word and cannot be used as an identifier"
        );
        assert_eq!(diagnostics[0].span().map(|s| s.start()), Some(4));
    }

    #[test]
    fn struct_missing_comma() {
        let (unit, diagnostics) = parse("struct S { a: i32 b: f32 }\nfn main() {}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "expected `,`, but found identifier"
        );
        let unit = unit.unwrap();
        assert_eq!(unit.structs().next().map(|s| s.members.len()), Some(2));
        assert_eq!(unit.functions().next().map(|f| f.name.as_str()), Some("main"));
    }

    #[test]
    fn attributes_on_constants() {
        let (_, diagnostics) = parse("@id(0) const a = 1;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "attributes are not allowed on constant declarations"
        );
    }

    #[test]
    fn empty_struct() {
        let (_, diagnostics) = parse("struct S {}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message(),
            "struct `S` must have at least one member"
        );
    }
}
