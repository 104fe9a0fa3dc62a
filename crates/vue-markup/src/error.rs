//! Parse error types.

use crate::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered inside a tag.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// The source ended inside a tag.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// An element was never closed.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
    },

    /// A closing tag did not match the innermost open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        /// The expected tag name.
        expected: String,
        /// The found tag name.
        found: String,
    },

    /// An attribute could not be read.
    #[error("invalid attribute: {message}")]
    InvalidAttribute {
        /// A description of the problem.
        message: String,
    },

    /// The same attribute appears twice on one element.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The name of the duplicated attribute.
        name: String,
    },

    /// A `<!--` without a matching `-->`.
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::MismatchedClosingTag {
                expected: "div".to_string(),
                found: "span".to_string(),
            },
            Span::from_range(0..1),
        );
        assert_eq!(
            error.to_string(),
            "mismatched closing tag: expected </div>, found </span>"
        );
    }
}
