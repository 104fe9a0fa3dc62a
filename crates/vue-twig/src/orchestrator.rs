//! Main orchestration logic.

use crate::cli::Args;
use crate::config::ProjectConfig;
use crate::output::{display_path, Failure, FailureKind, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic;
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};
use twig_compiler::CompilerOptions;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(vue_twig::invalid_glob))]
    InvalidGlob(String),

    /// A path given on the command line does not exist.
    #[error("no such file or directory: {0}")]
    #[diagnostic(code(vue_twig::missing_path))]
    MissingPath(Utf8PathBuf),

    /// Failed to write an output file.
    #[error("failed to write {path}: {message}")]
    #[diagnostic(code(vue_twig::write_failed))]
    WriteFailed { path: Utf8PathBuf, message: String },

    /// The working directory is not valid UTF-8.
    #[error("working directory is not valid UTF-8")]
    #[diagnostic(code(vue_twig::invalid_cwd))]
    InvalidWorkingDirectory,
}

/// A source file and where it sits relative to the path that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    pub relative: Utf8PathBuf,
}

/// Runs the conversion on all files.
pub fn run(args: Args) -> Result<RunSummary, OrchestratorError> {
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .ok_or(OrchestratorError::InvalidWorkingDirectory)?;

    let config = ProjectConfig::load(&cwd, args.config.as_deref());
    let options = config.compiler_options(&args);
    let ignore_set = build_ignore_set(&args.ignore, &config.exclude)?;

    let mut files = Vec::new();
    for path in &args.paths {
        files.extend(discover(path, &config.file_extensions(), &ignore_set)?);
    }
    info!(count = files.len(), "discovered files");

    // One compiler per file: the chain cursor is per conversion.
    let results: Vec<Result<String, Failure>> = files
        .par_iter()
        .map(|file| convert_file(file, &options, &cwd))
        .collect();

    let mut failures = Vec::new();
    let mut converted = Vec::new();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(twig) => converted.push((file, twig)),
            Err(failure) => failures.push(failure),
        }
    }

    match &args.out_dir {
        Some(out_dir) => {
            for (file, twig) in &converted {
                write_output(out_dir, file, twig)?;
            }
        }
        None => print_results(&converted, &cwd),
    }

    let summary = RunSummary {
        file_count: files.len(),
        failed_count: failures.len(),
    };

    let formatter = Formatter::new(args.output);
    let report = formatter.format(&failures);
    if !report.is_empty() {
        eprint!("{report}");
        if !report.ends_with('\n') {
            eprintln!();
        }
    }
    if args.output != crate::cli::OutputFormat::Json && !args.quiet {
        eprintln!("{}", summary.format());
    }

    Ok(summary)
}

fn build_ignore_set(ignore: &[String], exclude: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ignore.iter().chain(exclude) {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }

    // Add default ignores
    for pattern in ["**/node_modules/**", "**/dist/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }

    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Finds convertible files under `path`.
///
/// A file named directly is always taken; directories are walked for
/// `extensions`, skipping anything matched by `ignore_set`.
pub fn discover(
    path: &Utf8Path,
    extensions: &[&str],
    ignore_set: &GlobSet,
) -> Result<Vec<SourceFile>, OrchestratorError> {
    if path.is_file() {
        let relative = Utf8PathBuf::from(path.file_name().unwrap_or(path.as_str()));
        return Ok(vec![SourceFile {
            path: path.to_owned(),
            relative,
        }]);
    }
    if !path.is_dir() {
        return Err(OrchestratorError::MissingPath(path.to_owned()));
    }

    let files = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| {
            let file_name = p.file_name().unwrap_or("");
            extensions.iter().any(|ext| file_name.ends_with(ext))
        })
        .filter_map(|p| {
            let relative = p.strip_prefix(path).unwrap_or(&p).to_owned();
            if ignore_set.is_match(relative.as_str()) {
                debug!(path = %p, "ignored");
                return None;
            }
            Some(SourceFile { path: p, relative })
        })
        .collect();

    Ok(files)
}

fn convert_file(
    file: &SourceFile,
    options: &CompilerOptions,
    cwd: &Utf8Path,
) -> Result<String, Failure> {
    let path = display_path(&file.path, cwd);
    let source = fs::read_to_string(&file.path).map_err(|e| Failure {
        path: path.clone(),
        kind: FailureKind::Read(e.to_string()),
    })?;

    debug!(%path, "converting");
    twig_compiler::compile(&source, options).map_err(|error| Failure {
        path,
        kind: FailureKind::Compile { error, source },
    })
}

/// Output location for `file`: its relative path with a `.twig` extension.
pub fn output_path(out_dir: &Utf8Path, file: &SourceFile) -> Utf8PathBuf {
    out_dir.join(file.relative.with_extension("twig"))
}

fn write_output(out_dir: &Utf8Path, file: &SourceFile, twig: &str) -> Result<(), OrchestratorError> {
    let target = output_path(out_dir, file);
    let write_failed = |e: std::io::Error| OrchestratorError::WriteFailed {
        path: target.clone(),
        message: e.to_string(),
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    let mut contents = twig.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    fs::write(&target, contents).map_err(write_failed)?;
    debug!(path = %target, "wrote");
    Ok(())
}

fn print_results(converted: &[(&SourceFile, String)], cwd: &Utf8Path) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let banner = converted.len() > 1;
    for (file, twig) in converted {
        // A closed pipe only loses output.
        let _ = if banner {
            writeln!(out, "{{# {} #}}\n{}", display_path(&file.path, cwd), twig)
        } else {
            writeln!(out, "{twig}")
        };
    }
}
