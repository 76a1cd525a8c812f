//! Locating and parsing the markup a JSX/TSX module renders.
//!
//! The module is parsed with oxc to find its component: the default export
//! when there is one, otherwise the last top-level component. The markup the
//! component finally returns is then parsed by the span-preserving markup
//! parser, so byte offsets stay module-relative.

use crate::dialect::Flavor;
use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use crate::spans::ParsedDocument;
use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Declaration, ExportDefaultDeclarationKind, Expression, Function, ObjectPropertyKind, Program,
    Statement, VariableDeclarator,
};
use oxc::parser::Parser as ModuleParser;
use oxc::span::{SourceType, Span};
use std::ops::Range;

/// Identifier chains (`export default memo(Card)`) are followed this deep
const MAX_INDIRECTION: usize = 8;

/// Markup embedded in a script module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxDocument {
    pub parsed: ParsedDocument,
    /// Byte range of the markup inside the module
    pub region: Range<usize>,
}

/// Byte range of the element or fragment rendered by the module's component.
///
/// The module is read as JSX first and as TSX when that fails.
pub fn locate_markup(source: &str) -> ParseResult<Range<usize>> {
    let allocator = Allocator::default();
    let mut failure = None;

    for source_type in [SourceType::jsx(), SourceType::tsx()] {
        let ret = ModuleParser::new(&allocator, source, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            if failure.is_none() {
                failure = ret.errors.first().map(|error| error.to_string());
            }
            continue;
        }
        return Module::new(&ret.program)
            .render_markup()
            .map(|span| span.start as usize..span.end as usize)
            .ok_or_else(|| ParseError::invalid_section(0, "the module renders no JSX markup"));
    }

    Err(ParseError::invalid_section(
        0,
        format!("script does not parse: {}", failure.unwrap_or_default()),
    ))
}

/// Parse the render markup of a JSX/TSX module
pub fn parse_jsx_document(source: &str) -> ParseResult<JsxDocument> {
    let region = locate_markup(source)?;
    let start = region.start;
    let (parsed, end) = Parser::bounded(source, Flavor::Jsx, region).parse_root_element()?;
    Ok(JsxDocument {
        parsed,
        region: start..end,
    })
}

/// Top-level binding a component can be declared with
enum Declared<'p, 'a> {
    Function(&'p Function<'a>),
    Variable(&'p VariableDeclarator<'a>),
}

impl Declared<'_, '_> {
    fn is_named(&self, name: &str) -> bool {
        match self {
            Declared::Function(function) => function.id.as_ref().is_some_and(|id| id.name.as_str() == name),
            Declared::Variable(declarator) => declarator
                .id
                .get_identifier_name()
                .is_some_and(|id| id.as_str() == name),
        }
    }
}

struct Module<'p, 'a> {
    program: &'p Program<'a>,
    declared: Vec<Declared<'p, 'a>>,
}

impl<'p, 'a> Module<'p, 'a> {
    fn new(program: &'p Program<'a>) -> Self {
        let mut declared = Vec::new();
        for statement in &program.body {
            match statement {
                Statement::FunctionDeclaration(function) => declared.push(Declared::Function(&**function)),
                Statement::VariableDeclaration(variables) => {
                    declared.extend(variables.declarations.iter().map(Declared::Variable));
                }
                Statement::ExportNamedDeclaration(export) => match &export.declaration {
                    Some(Declaration::FunctionDeclaration(function)) => {
                        declared.push(Declared::Function(&**function));
                    }
                    Some(Declaration::VariableDeclaration(variables)) => {
                        declared.extend(variables.declarations.iter().map(Declared::Variable));
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        Self { program, declared }
    }

    fn render_markup(&self) -> Option<Span> {
        let default_export = self.program.body.iter().find_map(|statement| match statement {
            Statement::ExportDefaultDeclaration(export) => Some(export),
            _ => None,
        });
        let exported = default_export.and_then(|export| match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(function) => function_markup(function),
            kind => kind
                .as_expression()
                .and_then(|expression| self.component(expression, 0)),
        });

        exported.or_else(|| {
            self.declared
                .iter()
                .rev()
                .find_map(|declared| self.declared_markup(declared, 0))
        })
    }

    fn declared_markup(&self, declared: &Declared<'p, 'a>, depth: usize) -> Option<Span> {
        match declared {
            Declared::Function(function) => function_markup(function),
            Declared::Variable(declarator) => declarator
                .init
                .as_ref()
                .and_then(|init| self.component(init, depth)),
        }
    }

    /// Markup rendered by a component value: a function, a wrapper call such
    /// as `memo(...)`, an object with a `render` method or a reference to a
    /// top-level binding holding one of those
    fn component(&self, expression: &Expression<'a>, depth: usize) -> Option<Span> {
        if depth > MAX_INDIRECTION {
            return None;
        }
        match expression {
            Expression::ParenthesizedExpression(inner) => self.component(&inner.expression, depth),
            Expression::ArrowFunctionExpression(arrow) if arrow.expression => {
                match arrow.body.statements.first() {
                    Some(Statement::ExpressionStatement(body)) => markup(&body.expression),
                    _ => None,
                }
            }
            Expression::ArrowFunctionExpression(arrow) => final_return(&arrow.body.statements),
            Expression::FunctionExpression(function) => function_markup(function),
            Expression::CallExpression(call) => call
                .arguments
                .iter()
                .rev()
                .filter_map(|argument| argument.as_expression())
                .find_map(|argument| self.component(argument, depth + 1)),
            Expression::ObjectExpression(object) => object.properties.iter().find_map(|property| match property {
                ObjectPropertyKind::ObjectProperty(property)
                    if property.key.static_name().is_some_and(|name| name == "render") =>
                {
                    self.component(&property.value, depth + 1)
                }
                _ => None,
            }),
            Expression::Identifier(reference) => {
                let name = reference.name.as_str();
                self.declared
                    .iter()
                    .find(|declared| declared.is_named(name))
                    .and_then(|declared| self.declared_markup(declared, depth + 1))
            }
            _ => None,
        }
    }
}

fn function_markup(function: &Function<'_>) -> Option<Span> {
    function
        .body
        .as_ref()
        .and_then(|body| final_return(&body.statements))
}

/// Markup of the last `return` in a function body. Returns nested in
/// conditionals are guards, not the component's render output.
fn final_return(statements: &[Statement<'_>]) -> Option<Span> {
    statements
        .iter()
        .rev()
        .find_map(|statement| match statement {
            Statement::ReturnStatement(ret) => Some(ret),
            _ => None,
        })
        .and_then(|ret| ret.argument.as_ref())
        .and_then(markup)
}

fn markup(expression: &Expression<'_>) -> Option<Span> {
    match expression {
        Expression::ParenthesizedExpression(inner) => markup(&inner.expression),
        Expression::JSXElement(element) => Some(element.span),
        Expression::JSXFragment(fragment) => Some(fragment.span),
        _ => None,
    }
}
