//! Directive attribute names and micro-grammars.

pub const V_IF: &str = "v-if";
pub const V_ELSE_IF: &str = "v-else-if";
pub const V_ELSE: &str = "v-else";
pub const V_SHOW: &str = "v-show";
pub const V_FOR: &str = "v-for";
pub const V_HTML: &str = "v-html";
pub const V_TEXT: &str = "v-text";

const BIND_PREFIXES: &[&str] = &["v-bind:", ":"];
const EVENT_PREFIXES: &[&str] = &["v-on:", "on:", "@"];

/// Returns the bound attribute name if `attribute` is a binding.
///
/// `Some("")` means the binding prefix is present but the name is empty.
pub fn binding_name(attribute: &str) -> Option<&str> {
    BIND_PREFIXES
        .iter()
        .find_map(|prefix| attribute.strip_prefix(prefix))
}

/// Whether `attribute` is an event listener.
pub fn is_event_handler(attribute: &str) -> bool {
    EVENT_PREFIXES
        .iter()
        .any(|prefix| attribute.starts_with(prefix))
}

/// A parsed `v-for` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForDirective {
    pub item: String,
    pub key: Option<String>,
    pub index: Option<String>,
    pub list: String,
}

impl ForDirective {
    /// Parses `item in list`, `(item, key) in list` or
    /// `(item, key, index) in list`.
    ///
    /// The error is a short reason suitable for a diagnostic.
    pub fn parse(value: &str) -> Result<Self, &'static str> {
        let (left, list) = value
            .split_once(" in ")
            .ok_or("missing ` in ` separator")?;
        let list = list.trim();
        if list.is_empty() {
            return Err("empty list expression");
        }

        let left = left.trim();
        let left = left
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(left);
        let names: Vec<&str> = left.split(',').map(str::trim).collect();
        if names.iter().any(|name| name.is_empty()) {
            return Err("empty loop variable");
        }

        let (item, key, index) = match names.as_slice() {
            [item] => (*item, None, None),
            [item, key] => (*item, Some(*key), None),
            [item, key, index] => (*item, Some(*key), Some(*index)),
            _ => return Err("too many loop variables"),
        };

        Ok(Self {
            item: item.to_string(),
            key: key.map(str::to_string),
            index: index.map(str::to_string),
            list: list.to_string(),
        })
    }
}
