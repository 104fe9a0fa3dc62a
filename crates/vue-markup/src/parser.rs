//! Error-recovering markup parser.
//!
//! Text is sliced directly from the source; tags are read with the logos
//! [`Lexer`]. Errors are collected and parsing continues, so a partial
//! document is always produced.

use crate::dom::{Comment, Document, Element, NodeId, NodeKind, Text};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{ParseResult, Span};
use smol_str::SmolStr;
use std::iter::Peekable;

/// HTML void elements that never have a closing tag.
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is kept verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Returns true if the given element name is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS
        .iter()
        .any(|raw| raw.eq_ignore_ascii_case(name))
}

/// An element that has been opened but not closed yet.
struct OpenElement {
    id: NodeId,
    name: SmolStr,
    start: usize,
}

/// The markup parser.
pub struct Parser<'src> {
    source: &'src str,
    /// Current byte offset.
    pos: usize,
    document: Document,
    open: Vec<OpenElement>,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            document: Document::new(),
            open: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Parses the whole source.
    pub fn parse(mut self) -> ParseResult {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            if rest.starts_with("<!--") {
                self.parse_comment();
            } else if starts_closing_tag(rest) {
                self.parse_closing_tag();
            } else if starts_opening_tag(rest) {
                self.parse_element();
            } else {
                self.parse_text();
            }
        }

        while let Some(open) = self.open.pop() {
            self.error(
                ParseErrorKind::UnclosedTag {
                    tag_name: open.name.to_string(),
                },
                Span::from_range(open.start..open.start + open.name.len() + 1),
            );
            self.close(open, self.source.len());
        }

        ParseResult {
            document: self.document,
            errors: self.errors,
        }
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    /// The node new children are appended to.
    fn current_parent(&self) -> NodeId {
        self.open
            .last()
            .map(|open| open.id)
            .unwrap_or_else(|| self.document.root())
    }

    fn push_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.document.alloc(kind, span);
        let parent = self.current_parent();
        self.document.append_child(parent, id);
        id
    }

    fn close(&mut self, open: OpenElement, end: usize) {
        self.document
            .set_span(open.id, Span::from_range(open.start..end));
    }

    /// Parses text up to the next tag, keeping `{{ … }}` spans intact.
    fn parse_text(&mut self) {
        let start = self.pos;
        let end = find_text_end(self.source, start);
        self.pos = end;
        self.push_node(
            NodeKind::Text(Text {
                data: self.source[start..end].to_string(),
            }),
            Span::from_range(start..end),
        );
    }

    /// Parses an HTML comment.
    fn parse_comment(&mut self) {
        let start = self.pos;
        let content_start = start + 4;
        let (data, end) = match self.source[content_start..].find("-->") {
            Some(len) => (
                &self.source[content_start..content_start + len],
                content_start + len + 3,
            ),
            None => {
                self.error(
                    ParseErrorKind::UnterminatedComment,
                    Span::from_range(start..content_start),
                );
                (&self.source[content_start..], self.source.len())
            }
        };
        self.pos = end;
        self.push_node(
            NodeKind::Comment(Comment {
                data: data.to_string(),
            }),
            Span::from_range(start..end),
        );
    }

    /// Parses an opening tag and, for raw-text elements, its content.
    fn parse_element(&mut self) {
        let start = self.pos;
        let mut lexer = Lexer::new(self.source, start);
        // `<` is guaranteed by `starts_opening_tag`.
        let _ = lexer.next();
        let source = self.source;
        let mut tokens = lexer.peekable();

        let name = match tokens.next() {
            Some(token) if token.kind == TokenKind::Name => SmolStr::new(token.span.slice(source)),
            _ => {
                // Unreachable in practice: the tag start was checked.
                self.pos = start + 1;
                return;
            }
        };

        let mut element = Element::new(name.clone());
        let end = loop {
            let Some(token) = tokens.next() else {
                break source.len();
            };
            match token.kind {
                TokenKind::RAngle => break u32::from(token.span.end) as usize,
                TokenKind::SlashRAngle => {
                    element.self_closing = true;
                    break u32::from(token.span.end) as usize;
                }
                TokenKind::Name => self.parse_attribute(&mut element, token, &mut tokens),
                TokenKind::Eof => {
                    self.error(
                        ParseErrorKind::UnexpectedEof {
                            expected: format!("'>' to close <{}>", name),
                        },
                        token.span,
                    );
                    break source.len();
                }
                TokenKind::LAngle | TokenKind::LAngleSlash => {
                    // A new tag starts before this one was closed: stop here.
                    self.error(
                        ParseErrorKind::UnexpectedToken {
                            expected: "'>'".to_string(),
                            found: token.kind.name().to_string(),
                        },
                        token.span,
                    );
                    break u32::from(token.span.start) as usize;
                }
                other => {
                    self.error(
                        ParseErrorKind::UnexpectedToken {
                            expected: "attribute name or '>'".to_string(),
                            found: other.name().to_string(),
                        },
                        token.span,
                    );
                }
            }
        };

        self.pos = end;
        let void = is_void_element(&name);
        let self_closing = element.self_closing;
        let id = self.push_node(NodeKind::Element(element), Span::from_range(start..end));

        if self_closing || void {
            return;
        }

        let open = OpenElement { id, name, start };
        if is_raw_text_element(&open.name) {
            self.parse_raw_text(open);
        } else {
            self.open.push(open);
        }
    }

    /// Reads one attribute whose name token was already consumed.
    fn parse_attribute<I>(&mut self, element: &mut Element, name: Token, tokens: &mut Peekable<I>)
    where
        I: Iterator<Item = Token>,
    {
        let attr_name = SmolStr::new(name.span.slice(self.source));

        let value = if tokens.peek().map(|t| t.kind) == Some(TokenKind::Eq) {
            let eq = tokens.next();
            match tokens.peek().map(|t| t.kind) {
                Some(TokenKind::DoubleQuoted | TokenKind::SingleQuoted) => {
                    let token = tokens.next();
                    token.map(|t| {
                        let raw = t.span.slice(self.source);
                        raw[1..raw.len() - 1].to_string()
                    })
                }
                Some(TokenKind::Name) => tokens.next().map(|t| t.span.slice(self.source).to_string()),
                _ => {
                    let span = eq.map(|t| t.span).unwrap_or(name.span);
                    self.error(
                        ParseErrorKind::InvalidAttribute {
                            message: format!("missing or unterminated value for `{}`", attr_name),
                        },
                        name.span.cover(span),
                    );
                    // Skip the broken value so the tag can still be closed.
                    if tokens.peek().map(|t| t.kind) == Some(TokenKind::Error) {
                        tokens.next();
                    }
                    None
                }
            }
        } else {
            None
        };

        if element.attributes.contains(&attr_name) {
            self.error(
                ParseErrorKind::DuplicateAttribute {
                    name: attr_name.to_string(),
                },
                name.span,
            );
            return;
        }

        match value {
            Some(value) => element.attributes.set(attr_name, value),
            None => element.attributes.set_valueless(attr_name),
        }
    }

    /// Keeps the content of `<script>`, `<style>` and `<textarea>` verbatim.
    fn parse_raw_text(&mut self, open: OpenElement) {
        let content_start = self.pos;
        let close = find_closing_tag_ignore_case(self.source, content_start, &open.name);
        let (content_end, end) = match close {
            Some(at) => {
                let end = self.source[at..]
                    .find('>')
                    .map(|gt| at + gt + 1)
                    .unwrap_or(self.source.len());
                (at, end)
            }
            None => {
                self.error(
                    ParseErrorKind::UnclosedTag {
                        tag_name: open.name.to_string(),
                    },
                    Span::from_range(open.start..content_start),
                );
                (self.source.len(), self.source.len())
            }
        };

        if content_end > content_start {
            let text = self.document.alloc(
                NodeKind::Text(Text {
                    data: self.source[content_start..content_end].to_string(),
                }),
                Span::from_range(content_start..content_end),
            );
            self.document.append_child(open.id, text);
        }
        self.pos = end;
        self.close(open, end);
    }

    /// Parses `</name>` and closes the matching open element.
    fn parse_closing_tag(&mut self) {
        let start = self.pos;
        let mut lexer = Lexer::new(self.source, start);
        let _ = lexer.next();
        let name_token = lexer.next();
        let found = name_token
            .as_ref()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.span.slice(self.source).to_string())
            .unwrap_or_default();

        let end = match lexer.next() {
            Some(token) if token.kind == TokenKind::RAngle => u32::from(token.span.end) as usize,
            Some(token) => {
                self.error(
                    ParseErrorKind::UnexpectedToken {
                        expected: "'>'".to_string(),
                        found: token.kind.name().to_string(),
                    },
                    token.span,
                );
                self.source[start..]
                    .find('>')
                    .map(|gt| start + gt + 1)
                    .unwrap_or(self.source.len())
            }
            None => self.source.len(),
        };
        self.pos = end;
        let span = Span::from_range(start..end);

        let Some(depth) = self
            .open
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(&found))
        else {
            let expected = self
                .open
                .last()
                .map(|open| open.name.to_string())
                .unwrap_or_default();
            self.error(ParseErrorKind::MismatchedClosingTag { expected, found }, span);
            return;
        };

        while self.open.len() > depth + 1 {
            if let Some(unclosed) = self.open.pop() {
                self.error(
                    ParseErrorKind::UnclosedTag {
                        tag_name: unclosed.name.to_string(),
                    },
                    span,
                );
                self.close(unclosed, start);
            }
        }
        if let Some(open) = self.open.pop() {
            self.close(open, end);
        }
    }
}

fn starts_opening_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn starts_closing_tag(rest: &str) -> bool {
    rest.starts_with("</") && rest[2..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Finds where a text run starting at `start` ends.
///
/// A `<` only ends the run when it begins a tag or a comment, and `{{ … }}`
/// spans are skipped as a whole.
fn find_text_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == b'{' && bytes.get(i + 1) == Some(&b'{') {
            match source[i + 2..].find("}}") {
                Some(len) => i += 2 + len + 2,
                None => i += 2,
            }
            continue;
        }
        if bytes[i] == b'<' && i > start {
            let rest = &source[i..];
            if rest.starts_with("<!--") || starts_closing_tag(rest) || starts_opening_tag(rest) {
                return i;
            }
        }
        i += 1;
    }
    bytes.len()
}

fn find_closing_tag_ignore_case(source: &str, from: usize, name: &str) -> Option<usize> {
    let needle = format!("</{}", name.to_ascii_lowercase());
    source[from..]
        .to_ascii_lowercase()
        .find(&needle)
        .map(|at| from + at)
}
