//! Vue template to Twig compiler.
//!
//! This crate rewrites the `<template>` of a Vue single-file component into
//! Twig source:
//! - `v-if`/`v-else-if`/`v-else`/`v-show` become `{% if %}` chains
//! - `v-for` becomes `{% for %}` loops
//! - `:attr` bindings become `{{ … }}` attribute values
//! - event listeners are dropped
//! - JavaScript expressions are rewritten into Twig expressions
//!
//! # Example
//!
//! ```
//! use twig_compiler::{compile, CompilerOptions};
//!
//! let source = r#"<template><ul><li v-for="item in items" :key="item.id">{{ item.name }}</li></ul></template>"#;
//! let twig = compile(source, &CompilerOptions::default()).unwrap();
//! assert_eq!(
//!     twig,
//!     "<ul>{% for item in items %}<li>{{ item.name }}</li>{% endfor %}</ul>"
//! );
//! ```

mod binding;
mod builder;
mod chain;
mod compiler;
mod directives;
mod edits;
mod error;
mod expression;
mod finisher;

pub use binding::{kebab_case, BindingValue};
pub use builder::{Delimiters, Property, TwigBuilder};
pub use chain::{ChainCursor, ChainMode};
pub use compiler::{root_element, Compiler, CompilerOptions};
pub use directives::ForDirective;
pub use edits::{Applied, AttributeEdit, ElementEdits};
pub use error::{CompileError, CompileResult};
pub use expression::{
    flatten_template_literals, rewrite_condition, rewrite_interpolation, Quote, ScanState,
    REPLACEMENTS,
};
pub use finisher::{finish, DOUBLE_CURLY_CLOSE, DOUBLE_CURLY_OPEN};

/// Parses `source` and converts its template.
///
/// The first markup parse error aborts the conversion.
pub fn compile(source: &str, options: &CompilerOptions) -> CompileResult<String> {
    let result = vue_markup::parse(source);
    if let Some(error) = result.errors.into_iter().next() {
        return Err(error.into());
    }
    let mut document = result.document;
    Compiler::new(options.clone()).convert(&mut document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_fatal() {
        let err = compile("<template><div></template>", &CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert!(err.span().is_some());
    }
}
