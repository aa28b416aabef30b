use anyhow::Result;
use clap::Parser;

use ndrp::cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Refine(args) => ndrp::cli::refine::run(&args),
        Commands::Validate(args) => ndrp::cli::validate::run(&args),
    }
}
