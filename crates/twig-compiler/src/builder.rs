//! Twig control tag rendering.

use serde::Deserialize;
use smol_str::SmolStr;

use crate::expression::rewrite_condition;

/// Delimiter configuration for the generated Twig source.
///
/// Every pair is `[open, close]`. Missing fields fall back to Twig's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Delimiters {
    pub tag_comment: (String, String),
    pub tag_block: (String, String),
    pub tag_variable: (String, String),
    pub whitespace_trim: String,
    pub interpolation: (String, String),
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            tag_comment: ("{#".into(), "#}".into()),
            tag_block: ("{%".into(), "%}".into()),
            tag_variable: ("{{".into(), "}}".into()),
            whitespace_trim: "-".into(),
            interpolation: ("#{".into(), "}".into()),
        }
    }
}

/// A named value passed to an included partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: SmolStr,
    /// Twig expression, already rewritten.
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Renders control-flow intents into Twig tag text.
///
/// The builder holds no state besides its configuration, so one instance can
/// be shared by any number of conversions.
#[derive(Debug, Clone, Default)]
pub struct TwigBuilder {
    delimiters: Delimiters,
    trim: bool,
}

impl TwigBuilder {
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            delimiters,
            trim: false,
        }
    }

    /// Render block tags with whitespace control (`{%- … -%}`).
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Wraps `content` in block delimiters.
    pub fn create_block(&self, content: &str) -> String {
        let (open, close) = &self.delimiters.tag_block;
        if self.trim {
            let trim = &self.delimiters.whitespace_trim;
            format!("{open}{trim} {content} {trim}{close}")
        } else {
            format!("{open} {content} {close}")
        }
    }

    pub fn create_if(&self, condition: &str) -> String {
        self.create_block(&format!("if {}", rewrite_condition(condition)))
    }

    pub fn create_else_if(&self, condition: &str) -> String {
        self.create_block(&format!("elseif {}", rewrite_condition(condition)))
    }

    pub fn create_else(&self) -> String {
        self.create_block("else")
    }

    pub fn create_end_if(&self) -> String {
        self.create_block("endif")
    }

    pub fn create_for_item_in_list(&self, item: &str, list: &str) -> String {
        self.create_block(&format!("for {item} in {list}"))
    }

    pub fn create_for_key_in_list(&self, key: &str, list: &str) -> String {
        self.create_block(&format!("for {key} in {list}"))
    }

    pub fn create_for_key_and_item_in_list(&self, key: &str, item: &str, list: &str) -> String {
        self.create_block(&format!("for {key}, {item} in {list}"))
    }

    /// Opens a loop over `list`, binding whichever of `item` and `key` are
    /// given. Returns `None` when neither is.
    pub fn create_for(&self, list: &str, item: Option<&str>, key: Option<&str>) -> Option<String> {
        match (item, key) {
            (Some(item), Some(key)) => Some(self.create_for_key_and_item_in_list(key, item, list)),
            (Some(item), None) => Some(self.create_for_item_in_list(item, list)),
            (None, Some(key)) => Some(self.create_for_key_in_list(key, list)),
            (None, None) => None,
        }
    }

    pub fn create_end_for(&self) -> String {
        self.create_block("endfor")
    }

    /// Opens a capturing `set` block.
    pub fn create_set(&self, name: &str) -> String {
        self.create_block(&format!("set {name}"))
    }

    pub fn close_set(&self) -> String {
        self.create_block("endset")
    }

    pub fn create_variable(&self, name: &str, assignment: &str) -> String {
        self.create_block(&format!("set {name} = {assignment}"))
    }

    pub fn create_default_for_variable(&self, name: &str, default_value: &str) -> String {
        self.create_block(&format!("set {name} = {name}|default({default_value})"))
    }

    pub fn create_multiline_variable(&self, name: &str, assignment: &str) -> String {
        format!(
            "{}{}{}",
            self.create_set(name),
            assignment,
            self.close_set()
        )
    }

    /// Prints a variable, optionally falling back to another one.
    pub fn create_variable_output(&self, name: &str, fallback: Option<&str>) -> String {
        let (open, close) = &self.delimiters.tag_variable;
        match fallback {
            Some(fallback) => format!("{open} {name}|default({fallback}) {close}"),
            None => format!("{open} {name} {close}"),
        }
    }

    pub fn create_comment(&self, comment: &str) -> String {
        let (open, close) = &self.delimiters.tag_comment;
        format!("{open} {comment} {close}")
    }

    pub fn create_multiline_comment<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let (open, close) = &self.delimiters.tag_comment;
        let body = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        format!("{open} {body} {close}")
    }

    /// Embeds an expression inside a double-quoted Twig string.
    pub fn create_interpolation(&self, expression: &str) -> String {
        let (open, close) = &self.delimiters.interpolation;
        format!("{open}{expression}{close}")
    }

    /// Includes a partial, passing `properties` as its context.
    ///
    /// A `class` entry is always present; it defaults to `""`.
    pub fn create_include_partial(&self, path: &str, mut properties: Vec<Property>) -> String {
        if !properties.iter().any(|p| p.name == "class") {
            properties.push(Property::new("class", "\"\""));
        }
        self.create_block(&format!(
            "include \"{}\" with {}",
            path,
            self.serialize_component_properties(&properties)
        ))
    }

    /// Renders properties as a Twig hash literal, leaving out `key`.
    pub fn serialize_component_properties(&self, properties: &[Property]) -> String {
        let entries: Vec<String> = properties
            .iter()
            .filter(|p| p.name != "key")
            .map(|p| format!("'{}': {}", p.name, p.value))
            .collect();
        format!("{{ {} }}", entries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builder() -> TwigBuilder {
        TwigBuilder::default()
    }

    #[test]
    fn test_conditionals() {
        let b = builder();
        assert_eq!(b.create_if("a === 1 && !b"), "{% if a == 1 and not b %}");
        assert_eq!(b.create_else_if("c"), "{% elseif c %}");
        assert_eq!(b.create_else(), "{% else %}");
        assert_eq!(b.create_end_if(), "{% endif %}");
    }

    #[test]
    fn test_loops() {
        let b = builder();
        assert_eq!(
            b.create_for("items", Some("item"), None).as_deref(),
            Some("{% for item in items %}")
        );
        assert_eq!(
            b.create_for("items", Some("value"), Some("key")).as_deref(),
            Some("{% for key, value in items %}")
        );
        assert_eq!(
            b.create_for("items", None, Some("key")).as_deref(),
            Some("{% for key in items %}")
        );
        assert_eq!(b.create_for("items", None, None), None);
        assert_eq!(b.create_end_for(), "{% endfor %}");
    }

    #[test]
    fn test_variables() {
        let b = builder();
        assert_eq!(b.create_variable("x", "1"), "{% set x = 1 %}");
        assert_eq!(
            b.create_default_for_variable("size", "'md'"),
            "{% set size = size|default('md') %}"
        );
        assert_eq!(
            b.create_multiline_variable("body", "<p>hi</p>"),
            "{% set body %}<p>hi</p>{% endset %}"
        );
        assert_eq!(b.create_variable_output("name", None), "{{ name }}");
        assert_eq!(
            b.create_variable_output("name", Some("'anon'")),
            "{{ name|default('anon') }}"
        );
    }

    #[test]
    fn test_comments() {
        let b = builder();
        assert_eq!(b.create_comment("note"), "{# note #}");
        assert_eq!(b.create_multiline_comment(&["a", "b"]), "{# a\nb #}");
    }

    #[test]
    fn test_trimmed_blocks() {
        let b = builder().with_trim(true);
        assert_eq!(b.create_if("x"), "{%- if x -%}");
        assert_eq!(b.create_end_for(), "{%- endfor -%}");
    }

    #[test]
    fn test_custom_delimiters() {
        let b = TwigBuilder::new(Delimiters {
            tag_block: ("<%".into(), "%>".into()),
            ..Delimiters::default()
        });
        assert_eq!(b.create_else(), "<% else %>");
        assert_eq!(b.create_interpolation("x"), "#{x}");
    }

    #[test]
    fn test_include_defaults_class_and_skips_key() {
        let b = builder();
        let include = b.create_include_partial(
            "partials/card.twig",
            vec![Property::new("key", "id"), Property::new("title", "post.title")],
        );
        assert_eq!(
            include,
            r#"{% include "partials/card.twig" with { 'title': post.title, 'class': "" } %}"#
        );
    }

    #[test]
    fn test_include_keeps_given_class() {
        let b = builder();
        let include =
            b.create_include_partial("c.twig", vec![Property::new("class", "\"wide\"")]);
        assert_eq!(include, r#"{% include "c.twig" with { 'class': "wide" } %}"#);
    }

    #[test]
    fn test_delimiters_deserialize_partial() {
        let delimiters: Delimiters =
            serde_json::from_str(r#"{ "tagBlock": ["[%", "%]"] }"#).unwrap();
        assert_eq!(delimiters.tag_block, ("[%".to_string(), "%]".to_string()));
        assert_eq!(delimiters.tag_variable, ("{{".to_string(), "}}".to_string()));
    }
}
