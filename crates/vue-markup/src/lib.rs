//! Markup layer for vue-twig.
//!
//! This crate turns Vue single-file component source into an arena
//! [`Document`] and back into text:
//! - Tag lexer using `logos`
//! - Error-recovering parser that keeps text, comments and raw-text elements verbatim
//! - Arena document with stable [`NodeId`]s for in-place rewriting
//! - Serializer
//!
//! # Example
//!
//! ```
//! use vue_markup::{parse, serialize};
//!
//! let source = r#"<template><p v-if="ok">{{ msg }}</p></template>"#;
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//!
//! let doc = &result.document;
//! let p = doc.find_element("p").unwrap();
//! assert_eq!(serialize(doc, p), r#"<p v-if="ok">{{ msg }}</p>"#);
//! ```

mod dom;
mod error;
mod lexer;
mod parser;
mod serializer;
mod span;

pub use dom::{Attributes, Comment, Document, Element, Node, NodeId, NodeKind, Text};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::is_void_element;
pub use serializer::serialize;
pub use span::{LineCol, LineIndex, Span};
pub use text_size::TextSize;

/// The result of parsing a template source.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document.
    pub document: Document,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses template source into a document.
///
/// The parser recovers from errors where possible, returning both the
/// document and every error encountered.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}
