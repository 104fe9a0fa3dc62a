//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use tracing::{debug, warn};
use twig_compiler::{ChainMode, CompilerOptions, Delimiters};

use crate::cli::Args;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "vue-twig.json";

/// Project configuration from `vue-twig.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    /// File extensions to convert.
    pub extensions: Vec<String>,

    /// Glob patterns to skip.
    pub exclude: Vec<String>,

    pub delimiters: Delimiters,

    pub chain_mode: Option<ChainMode>,

    pub trim_blocks: bool,

    pub twig_comments: bool,

    /// Component tag name to partial path.
    pub components: IndexMap<String, String>,

    /// Variable name to default expression.
    pub defaults: IndexMap<String, String>,
}

impl ProjectConfig {
    /// Loads `explicit`, or `vue-twig.json` from `root` if present.
    ///
    /// An unreadable or malformed file is reported and defaults are used.
    pub fn load(root: &Utf8Path, explicit: Option<&Utf8Path>) -> Self {
        let path: Utf8PathBuf = match explicit {
            Some(path) => path.to_owned(),
            None => {
                let path = root.join(CONFIG_FILE);
                if !path.exists() {
                    return Self::default();
                }
                path
            }
        };

        match Self::parse_config(&path) {
            Ok(config) => {
                debug!(%path, "loaded configuration");
                config
            }
            Err(e) => {
                warn!("failed to load {}: {}", path, e);
                Self::default()
            }
        }
    }

    fn parse_config(path: &Utf8Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::parse_str(&content)
    }

    /// Parses configuration text. `//` and `/* */` comments are allowed.
    pub fn parse_str(content: &str) -> Result<Self, String> {
        let content = remove_json_comments(content);
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    /// Returns the file extensions to convert.
    pub fn file_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            vec![".vue"]
        } else {
            self.extensions.iter().map(|s| s.as_str()).collect()
        }
    }

    /// Builds compiler options, letting command line flags win.
    pub fn compiler_options(&self, args: &Args) -> CompilerOptions {
        CompilerOptions {
            delimiters: self.delimiters.clone(),
            chain_mode: args
                .chain_mode
                .map(ChainMode::from)
                .or(self.chain_mode)
                .unwrap_or_default(),
            trim_blocks: args.trim_blocks || self.trim_blocks,
            twig_comments: args.twig_comments || self.twig_comments,
            components: self.components.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            match c {
                '"' => in_string = false,
                '\\' => {
                    if let Some(next) = chars.next() {
                        result.push(next);
                    }
                }
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                result.push(c);
                in_string = true;
            }
            ('/', Some('/')) => {
                while chars.peek().is_some_and(|&next| next != '\n') {
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}
