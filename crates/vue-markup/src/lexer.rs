//! Tag lexer using logos.
//!
//! Only the inside of tags is tokenized: tag names, attribute names, `=` and
//! attribute values. Text between tags is sliced straight from the source by
//! the parser, so whitespace and interpolations survive untouched.

use crate::Span;
use logos::Logos;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds found inside a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// `<`
    #[token("<")]
    LAngle,

    /// `</`
    #[token("</")]
    LAngleSlash,

    /// `>`
    #[token(">")]
    RAngle,

    /// `/>`
    #[token("/>")]
    SlashRAngle,

    /// `/` not followed by `>`
    #[token("/")]
    Slash,

    /// `=`
    #[token("=")]
    Eq,

    /// `"..."`
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// `'...'`
    #[regex(r#"'[^']*'"#)]
    SingleQuoted,

    /// A tag name, attribute name or unquoted attribute value.
    ///
    /// Covers Vue directive spellings like `v-bind:title`, `:class`,
    /// `@click.prevent` and `#default`.
    #[regex(r#"[^\s"'<>/=]+"#)]
    Name,

    /// End of input
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LAngle => "'<'",
            TokenKind::LAngleSlash => "'</'",
            TokenKind::RAngle => "'>'",
            TokenKind::SlashRAngle => "'/>'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::DoubleQuoted => "double-quoted value",
            TokenKind::SingleQuoted => "single-quoted value",
            TokenKind::Name => "name",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer over the tag starting at a given offset of the source.
///
/// Spans are absolute offsets into the full source.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    offset: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer for `source`, starting at byte `offset`.
    pub fn new(source: &'src str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        Self {
            inner: TokenKind::lexer(&source[offset..]),
            source,
            offset,
            finished: false,
        }
    }

    /// Returns the text of a token.
    pub fn text(&self, token: &Token) -> &'src str {
        token.span.slice(self.source)
    }

    fn absolute(&self, range: std::ops::Range<usize>) -> Span {
        Span::from_range(self.offset + range.start..self.offset + range.end)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => Some(Token {
                kind,
                span: self.absolute(self.inner.span()),
            }),
            Some(Err(())) => Some(Token {
                kind: TokenKind::Error,
                span: self.absolute(self.inner.span()),
            }),
            None => {
                self.finished = true;
                let end = self.source.len();
                Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::from_range(end..end),
                })
            }
        }
    }
}
