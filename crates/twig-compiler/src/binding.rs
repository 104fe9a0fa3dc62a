//! `:class` and `:style` binding values.

use indexmap::IndexMap;

/// The shape of a `:class` or `:style` binding value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingValue {
    /// A plain expression, printed as is.
    RawExpression(String),
    /// An object or array literal written inline. It is not decomposed.
    ObjectLiteral(String),
    /// An already decomposed mapping of key to a truthy/value expression.
    TruthMap(IndexMap<String, String>),
}

impl BindingValue {
    /// Classifies a raw attribute value.
    ///
    /// Attribute text never yields a [`BindingValue::TruthMap`]; callers that
    /// have decomposed a literal construct that variant directly.
    pub fn classify(expression: &str) -> Self {
        let trimmed = expression.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            BindingValue::ObjectLiteral(expression.to_string())
        } else {
            BindingValue::RawExpression(expression.to_string())
        }
    }

    /// Joins the keys whose value is truthy with a space.
    pub fn flatten_class(map: &IndexMap<String, String>) -> String {
        map.iter()
            .filter(|(_, value)| is_truthy(value))
            .map(|(key, _)| unquote(key))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders `prop:value` pairs joined by `;`, kebab-casing the keys.
    pub fn flatten_style(map: &IndexMap<String, String>) -> String {
        map.iter()
            .filter(|(_, value)| is_truthy(value))
            .map(|(key, value)| format!("{}:{}", kebab_case(unquote(key)), unquote(value)))
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim(),
        "" | "false" | "0" | "null" | "undefined" | "''" | "\"\""
    )
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// `fontSize` becomes `font-size`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            BindingValue::classify("classes"),
            BindingValue::RawExpression("classes".into())
        );
        assert_eq!(
            BindingValue::classify(" { active: isActive }"),
            BindingValue::ObjectLiteral(" { active: isActive }".into())
        );
        assert!(matches!(
            BindingValue::classify("['a', b]"),
            BindingValue::ObjectLiteral(_)
        ));
    }

    #[test]
    fn test_flatten_class() {
        let classes = map(&[("active", "true"), ("hidden", "false"), ("'is-big'", "1")]);
        assert_eq!(BindingValue::flatten_class(&classes), "active is-big");
    }

    #[test]
    fn test_flatten_style() {
        let styles = map(&[("fontSize", "'12px'"), ("color", "red"), ("margin", "")]);
        assert_eq!(BindingValue::flatten_style(&styles), "font-size:12px;color:red");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("color"), "color");
    }
}
