//! vue-twig: convert Vue single-file component templates into Twig.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let summary = orchestrator::run(args)?;
    if summary.failed_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}
