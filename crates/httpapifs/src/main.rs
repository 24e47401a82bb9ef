//! HttpApiFS command-line client

use clap::Parser;
use httpapifs::cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    tracing::debug!("hafs starting");

    let cli = Cli::parse();
    cli.run()
}
