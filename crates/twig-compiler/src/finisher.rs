//! Sentinel substitution after serialization.

/// Stands in for `{{` inside attribute values until the tree is serialized.
pub const DOUBLE_CURLY_OPEN: &str = "__DOUBLE_CURLY_OPEN__";
/// Stands in for `}}` inside attribute values until the tree is serialized.
pub const DOUBLE_CURLY_CLOSE: &str = "__DOUBLE_CURLY_CLOSE__";

/// Wraps an expression in sentinel-delimited interpolation.
pub fn sentinel_interpolation(expression: &str) -> String {
    format!("{DOUBLE_CURLY_OPEN} {expression} {DOUBLE_CURLY_CLOSE}")
}

/// Replaces the sentinels with the variable delimiters.
pub fn finish(serialized: &str, open: &str, close: &str) -> String {
    serialized
        .replace(DOUBLE_CURLY_OPEN, open)
        .replace(DOUBLE_CURLY_CLOSE, close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish() {
        let attr = format!("<a href=\"{}\">", sentinel_interpolation("url"));
        assert_eq!(finish(&attr, "{{", "}}"), "<a href=\"{{ url }}\">");
    }

    #[test]
    fn test_finish_leaves_other_text() {
        assert_eq!(finish("{{ a }} __DOUBLE_CURLY__", "{{", "}}"), "{{ a }} __DOUBLE_CURLY__");
    }
}
