//! # Markup parsing for the visual editor
//!
//! ```text
//!   source text ──tokenizer──▶ tokens ──parser──▶ Document Tree + spans
//!                                                      │
//!                                     serializer ◀─────┘
//! ```
//!
//! HTML documents, JSX/TSX modules and Vue single-file components all parse
//! into the same [`Node`] tree. Spans recorded alongside the tree let text
//! patchers edit the original bytes instead of reprinting the file.

pub mod dialect;
pub mod error;
pub mod jsx;
pub mod parser;
pub mod sections;
pub mod serializer;
pub mod spans;
pub mod style;
pub mod text;
pub mod tokenizer;
pub mod tree;

#[cfg(test)]
mod tests_serializer;

pub use dialect::{Dialect, Flavor};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use jsx::{locate_markup, parse_jsx_document, JsxDocument};
pub use parser::{parse_document, Parser};
pub use sections::{split_sections, Section, SectionKind, Sections};
pub use serializer::{serialize, Serializer};
pub use spans::{AttributeSpan, ElementSpan, NodeSpan, ParsedDocument, SpanTree};
pub use tokenizer::{tokenize, MarkupToken, Tokenizer};
pub use tree::{AttributeMap, Element, Node, StyleMap, Text, ROOT_TAG};

/// Parse the markup document of a file in `dialect`.
///
/// Vue components parse their `<template>` section (an absent template is an
/// empty document); JSX/TSX modules parse the markup they render.
pub fn parse(text: &str, dialect: Dialect) -> ParseResult<Node> {
    parse_markup(text, dialect).map(|parsed| parsed.tree)
}

/// Like [`parse`], keeping byte spans relative to `text`
pub fn parse_markup(text: &str, dialect: Dialect) -> ParseResult<ParsedDocument> {
    match dialect {
        Dialect::Html => parse_document(text, Flavor::Html),
        Dialect::Jsx | Dialect::Tsx => parse_jsx_document(text).map(|doc| doc.parsed),
        Dialect::Vue => {
            let sections = split_sections(text)?;
            let region = sections
                .template
                .map_or(text.len()..text.len(), |template| template.content);
            Parser::bounded(text, Flavor::Html, region).parse_document()
        }
    }
}
