//! Report formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use serde::Serialize;
use twig_compiler::CompileError;
use vue_markup::{LineCol, LineIndex};

/// A conversion failure ready for output.
#[derive(Debug, Serialize)]
pub struct FormattedFailure {
    /// The file path.
    pub filename: String,
    /// The start position, if the error has a location.
    pub start: Option<Position>,
    /// The message.
    pub message: String,
    /// Short error code.
    pub code: &'static str,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// A file that could not be converted.
#[derive(Debug)]
pub struct Failure {
    pub path: String,
    pub kind: FailureKind,
}

#[derive(Debug)]
pub enum FailureKind {
    Read(String),
    Compile { error: CompileError, source: String },
}

impl Failure {
    fn code(&self) -> &'static str {
        match &self.kind {
            FailureKind::Read(_) => "read-failed",
            FailureKind::Compile { error, .. } => match error {
                CompileError::MissingTemplate => "missing-template",
                CompileError::Structural { .. } => "structural",
                CompileError::ChainState { .. } => "chain-state",
                CompileError::MalformedDirective { .. } => "malformed-directive",
                CompileError::Parse(_) => "parse-error",
            },
        }
    }

    fn message(&self) -> String {
        match &self.kind {
            FailureKind::Read(message) => format!("failed to read file: {message}"),
            FailureKind::Compile { error, .. } => error.to_string(),
        }
    }

    fn start(&self) -> Option<(LineCol, u32)> {
        let FailureKind::Compile { error, source } = &self.kind else {
            return None;
        };
        let span = error.span()?;
        let line_index = LineIndex::new(source);
        Some((line_index.line_col(span.start), u32::from(span.start)))
    }

    fn location(&self) -> String {
        match self.start() {
            Some((start, _)) => format!("{}:{}:{}", self.path, start.line + 1, start.col + 1),
            None => self.path.clone(),
        }
    }
}

/// Formats failures for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats every failure.
    pub fn format(&self, failures: &[Failure]) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(failures),
            OutputFormat::Json => self.format_json(failures),
            OutputFormat::Machine => self.format_machine(failures),
        }
    }

    fn format_human(&self, failures: &[Failure]) -> String {
        let mut output = String::new();
        for failure in failures {
            output.push_str(&format!(
                "{}\nError: {} ({})\n\n",
                failure.location(),
                failure.message(),
                failure.code()
            ));
        }
        output
    }

    fn format_json(&self, failures: &[Failure]) -> String {
        let formatted = Self::format_json_failures(failures);
        serde_json::to_string_pretty(&formatted).unwrap_or_default()
    }

    /// Formats failures into JSON-ready structs.
    pub fn format_json_failures(failures: &[Failure]) -> Vec<FormattedFailure> {
        failures
            .iter()
            .map(|failure| FormattedFailure {
                filename: failure.path.clone(),
                start: failure.start().map(|(start, offset)| Position {
                    line: start.line + 1,
                    column: start.col + 1,
                    offset,
                }),
                message: failure.message(),
                code: failure.code(),
            })
            .collect()
    }

    fn format_machine(&self, failures: &[Failure]) -> String {
        let mut output = String::new();
        for failure in failures {
            output.push_str(&format!(
                "ERROR {} {} ({})\n",
                failure.location(),
                failure.message(),
                failure.code()
            ));
        }
        output
    }
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of files found.
    pub file_count: usize,
    /// Number of files that failed.
    pub failed_count: usize,
}

impl RunSummary {
    /// Formats the summary line.
    pub fn format(&self) -> String {
        let file_word = if self.file_count == 1 { "file" } else { "files" };
        let converted = self.file_count - self.failed_count;
        format!(
            "vue-twig converted {} of {} {} ({} failed)",
            converted, self.file_count, file_word, self.failed_count
        )
    }
}

/// Path shown in reports: relative to `root` when possible.
pub fn display_path(path: &Utf8Path, root: &Utf8Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vue_markup::Span;

    fn chain_failure() -> Failure {
        let source = "<template>\n  <p v-else>x</p>\n</template>".to_string();
        Failure {
            path: "a.vue".into(),
            kind: FailureKind::Compile {
                error: CompileError::ChainState {
                    tag: "p".into(),
                    directive: "v-else",
                    span: Span::from_range(13..28),
                },
                source,
            },
        }
    }

    #[test]
    fn test_format_human() {
        let output = Formatter::new(OutputFormat::Human).format(&[chain_failure()]);
        assert!(output.contains("a.vue:2:3"));
        assert!(output.contains("no preceding `v-if`"));
        assert!(output.contains("(chain-state)"));
    }

    #[test]
    fn test_format_machine_without_location() {
        let failure = Failure {
            path: "b.vue".into(),
            kind: FailureKind::Compile {
                error: CompileError::MissingTemplate,
                source: String::new(),
            },
        };
        let output = Formatter::new(OutputFormat::Machine).format(&[failure]);
        assert_eq!(
            output,
            "ERROR b.vue no <template> element found (missing-template)\n"
        );
    }

    #[test]
    fn test_format_json() {
        let output = Formatter::new(OutputFormat::Json).format(&[chain_failure()]);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["filename"], "a.vue");
        assert_eq!(value[0]["start"]["line"], 2);
        assert_eq!(value[0]["code"], "chain-state");
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary {
            file_count: 3,
            failed_count: 1,
        };
        assert_eq!(summary.format(), "vue-twig converted 2 of 3 files (1 failed)");
    }
}
