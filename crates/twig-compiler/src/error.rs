//! Compile error types.

use smol_str::SmolStr;
use thiserror::Error;
use vue_markup::{ParseError, Span};

/// An error that aborts a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The document has no `<template>` element.
    #[error("no <template> element found")]
    MissingTemplate,

    /// The template container does not hold exactly one root element.
    #[error("template must contain exactly one root element, found {found}")]
    Structural {
        /// Number of non-text children found.
        found: usize,
        /// Location of the template container.
        span: Span,
    },

    /// `v-else-if` or `v-else` without a preceding conditional group.
    #[error("<{tag}> has `{directive}` but no preceding `v-if` or `v-else-if`")]
    ChainState {
        tag: SmolStr,
        directive: &'static str,
        span: Span,
    },

    /// A directive attribute whose value or name cannot be interpreted.
    #[error("<{tag}> has malformed `{attribute}=\"{value}\"`: {reason}")]
    MalformedDirective {
        tag: SmolStr,
        attribute: SmolStr,
        value: String,
        reason: &'static str,
        span: Span,
    },

    /// The markup could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl CompileError {
    /// Location of the offending source, if known.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::MissingTemplate => None,
            CompileError::Structural { span, .. }
            | CompileError::ChainState { span, .. }
            | CompileError::MalformedDirective { span, .. } => Some(*span),
            CompileError::Parse(err) => Some(err.span),
        }
    }
}

/// Result alias used throughout the compiler.
pub type CompileResult<T> = Result<T, CompileError>;
