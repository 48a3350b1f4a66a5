mod cli;
mod config;
mod seed;
mod tui;

use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use tracing_subscriber::EnvFilter;

use cli::commands::run_cli;
use cli::opts::Cli;
use config::AppConfig;

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    // RUST_LOG wins over the configured level. Logs go to stderr so stdout
    // stays clean for command output.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run_cli(args, config)
}
