//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use twig_compiler::ChainMode;

/// Convert Vue single-file component templates into Twig templates.
#[derive(Debug, Parser)]
#[command(name = "vue-twig")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files or directories to convert
    #[arg(default_value = ".")]
    pub paths: Vec<Utf8PathBuf>,

    /// Write `<name>.twig` files under this directory instead of printing
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Path to a vue-twig.json configuration file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// How `v-else` finds its `v-if`
    #[arg(long = "chain-mode", value_enum)]
    pub chain_mode: Option<ChainModeArg>,

    /// Emit block tags with whitespace control (`{%- -%}`)
    #[arg(long = "trim-blocks")]
    pub trim_blocks: bool,

    /// Convert HTML comments into Twig comments
    #[arg(long = "twig-comments")]
    pub twig_comments: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,
}

/// Report format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
    /// Machine-readable (one line per failure)
    Machine,
}

/// Chain cursor scoping.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChainModeArg {
    /// Chains only continue across siblings (default)
    Scoped,
    /// One chain cursor for the whole template
    Compat,
}

impl From<ChainModeArg> for ChainMode {
    fn from(arg: ChainModeArg) -> Self {
        match arg {
            ChainModeArg::Scoped => ChainMode::Scoped,
            ChainModeArg::Compat => ChainMode::Compat,
        }
    }
}

impl Args {
    /// Log level implied by `-v`/`-q`.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
