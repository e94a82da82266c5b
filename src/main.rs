use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod report;
mod snapshot;


use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ledgerscope");
    cli.run(&settings)
}
