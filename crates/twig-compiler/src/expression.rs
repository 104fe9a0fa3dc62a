//! JavaScript expression to Twig expression rewriting.
//!
//! Only a fixed set of textual rewrites is applied. Quoted string literals are
//! never touched; everything between them is rewritten run by run.

/// Literal spellings replaced verbatim after the operator rewrites.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    ("undefined", "null"),
    (".toUpperCase()", "|upper"),
    (".toLowerCase()", "|lower"),
    (".join(", "|join("),
];

/// A quote character that opens a string span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
    Backtick,
}

impl Quote {
    fn from_char(c: char, backticks: bool) -> Option<Self> {
        match c {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            '`' if backticks => Some(Quote::Backtick),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
            Quote::Backtick => '`',
        }
    }
}

/// Quote tracking for a single character scan.
///
/// A backslash inside a quoted span escapes the next character, so an escaped
/// quote never closes the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Unquoted,
    Quoted(Quote),
    Escaped(Quote),
}

impl ScanState {
    /// Advances the state over `c`. Backticks only count as quotes when
    /// `backticks` is set.
    pub fn step(self, c: char, backticks: bool) -> Self {
        match self {
            ScanState::Unquoted => match Quote::from_char(c, backticks) {
                Some(quote) => ScanState::Quoted(quote),
                None => ScanState::Unquoted,
            },
            ScanState::Quoted(quote) if c == '\\' => ScanState::Escaped(quote),
            ScanState::Quoted(quote) if c == quote.as_char() => ScanState::Unquoted,
            ScanState::Quoted(quote) | ScanState::Escaped(quote) => ScanState::Quoted(quote),
        }
    }

    pub fn is_unquoted(self) -> bool {
        self == ScanState::Unquoted
    }
}

/// Rewrites a JavaScript condition into Twig syntax.
///
/// ```
/// use twig_compiler::rewrite_condition;
///
/// assert_eq!(
///     rewrite_condition(r#"a === "b && c" && d"#),
///     r#"a == "b && c" and d"#
/// );
/// ```
pub fn rewrite_condition(condition: &str) -> String {
    let mut out = String::with_capacity(condition.len());
    let mut buffer = String::new();
    let mut state = ScanState::Unquoted;

    for c in condition.chars() {
        let next = state.step(c, false);
        if state.is_unquoted() && next.is_unquoted() {
            buffer.push(c);
        } else {
            if !buffer.is_empty() {
                out.push_str(&rewrite_unquoted(&buffer));
                buffer.clear();
            }
            out.push(c);
        }
        state = next;
    }
    if !buffer.is_empty() {
        out.push_str(&rewrite_unquoted(&buffer));
    }

    out
}

/// Rewrites every `{{ … }}` span of a text node.
///
/// Text outside the spans is copied as is. Inside a span, template literals
/// are flattened into `~` concatenations and the condition rules are applied.
/// An unterminated span is left untouched.
pub fn rewrite_interpolation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut buffer = String::new();
    let mut inside = false;
    let mut state = ScanState::Unquoted;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !inside {
            if c == '{' && chars.peek() == Some(&'{') {
                chars.next();
                out.push_str("{{");
                inside = true;
                state = ScanState::Unquoted;
            } else {
                out.push(c);
            }
            continue;
        }

        if state.is_unquoted() && c == '}' && chars.peek() == Some(&'}') {
            chars.next();
            let expression = flatten_template_literals(&buffer);
            out.push_str(&rewrite_condition(&expression));
            out.push_str("}}");
            buffer.clear();
            inside = false;
            continue;
        }

        state = state.step(c, true);
        buffer.push(c);
    }

    if inside {
        out.push_str(&buffer);
    }

    out
}

enum TemplatePart {
    Literal(String),
    Expression(String),
}

/// Rewrites back-tick template literals into `'text' ~ expr` concatenations.
///
/// ```
/// use twig_compiler::flatten_template_literals;
///
/// assert_eq!(
///     flatten_template_literals("`Hello ${user.name}!`"),
///     "'Hello ' ~ user.name ~ '!'"
/// );
/// ```
pub fn flatten_template_literals(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut state = ScanState::Unquoted;
    let mut chars = expression.chars().peekable();

    while let Some(c) = chars.next() {
        if state.is_unquoted() && c == '`' {
            let parts = read_template_literal(&mut chars);
            out.push_str(&join_template_parts(parts));
            continue;
        }
        state = state.step(c, false);
        out.push(c);
    }

    out
}

fn read_template_literal<I>(chars: &mut std::iter::Peekable<I>) -> Vec<TemplatePart>
where
    I: Iterator<Item = char>,
{
    let mut parts = Vec::new();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        match c {
            '`' => break,
            '\\' => {
                if let Some(escaped) = chars.next() {
                    if escaped != '`' && escaped != '$' {
                        literal.push('\\');
                    }
                    literal.push(escaped);
                }
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                if !literal.is_empty() {
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                }
                let inner = read_substitution(chars);
                parts.push(TemplatePart::Expression(
                    flatten_template_literals(inner.trim()),
                ));
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    parts
}

/// Reads a `${ … }` body up to its matching brace.
fn read_substitution<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut inner = String::new();
    let mut depth = 0usize;
    let mut state = ScanState::Unquoted;

    for c in chars.by_ref() {
        if state.is_unquoted() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => break,
                '}' => depth -= 1,
                _ => {}
            }
        }
        state = state.step(c, true);
        inner.push(c);
    }

    inner
}

fn join_template_parts(parts: Vec<TemplatePart>) -> String {
    if parts.is_empty() {
        return "''".to_string();
    }
    parts
        .into_iter()
        .map(|part| match part {
            TemplatePart::Literal(text) => format!("'{}'", text.replace('\'', "\\'")),
            TemplatePart::Expression(expr) => expr,
        })
        .collect::<Vec<_>>()
        .join(" ~ ")
}

/// Applies the operator rules and the replacement table to an unquoted run.
fn rewrite_unquoted(part: &str) -> String {
    let mut part = part.replace("===", "==").replace("!==", "!=");
    part = replace_operator(&part, "&&", "and");
    part = replace_operator(&part, "||", "or");
    part = rewrite_negation(&part);
    part = rewrite_suffix(&part, ".length", "|length");
    part = rewrite_suffix(&part, ".trim", "|trim");

    for (from, to) in REPLACEMENTS {
        part = part.replace(from, to);
    }

    part
}

/// Replaces a symbolic operator with a keyword, keeping it space-separated.
fn replace_operator(part: &str, operator: &str, keyword: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut rest = part;

    while let Some(at) = rest.find(operator) {
        out.push_str(&rest[..at]);
        if out.chars().last().is_some_and(|c| !c.is_whitespace()) {
            out.push(' ');
        }
        out.push_str(keyword);
        rest = &rest[at + operator.len()..];
        if rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
            out.push(' ');
        }
    }
    out.push_str(rest);

    out
}

/// Rewrites unary `!` into `not`. `!=` is left alone.
fn rewrite_negation(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut chars = part.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('!', Some(&next)) if next != '=' => {
                out.push_str("not");
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Rewrites a property suffix unless it continues into a longer identifier.
fn rewrite_suffix(part: &str, suffix: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut rest = part;

    while let Some(at) = rest.find(suffix) {
        out.push_str(&rest[..at]);
        rest = &rest[at + suffix.len()..];
        if rest.chars().next().is_some_and(is_ident_char) {
            out.push_str(suffix);
        } else {
            out.push_str(replacement);
        }
    }
    out.push_str(rest);

    out
}
