mod cli;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use link_remover::Codecs;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Per-file status goes to stdout; logs stay at error level unless -v
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let layout = cli.layout();
    let progress = console::ConsoleProgress::new(layout.input.clone(), cli.quiet);
    link_remover::run(&layout, &Codecs::builtin(), &progress)
        .with_context(|| format!("Batch in {} did not run", layout.input.display()))?;

    Ok(())
}
