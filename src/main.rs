use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use holdings::cli::Cli;
use holdings::{config, dispatcher};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config()?;

    // RUST_LOG wins over the configured level; logs go to stderr so --json stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.as_deref().unwrap_or("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatcher::dispatch(cli, &config)
}
