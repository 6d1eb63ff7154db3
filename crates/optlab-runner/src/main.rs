//! optlab command-line entry point.

use anyhow::Result;
use clap::Parser;
use optlab_runner::cli::Cli;
use optlab_runner::observability::init_tracing;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guards = init_tracing("optlab", cli.log_dir.as_deref(), cli.verbose)?;

    let output = optlab_runner::run(&cli)?;
    print!("{}", output);
    Ok(())
}
