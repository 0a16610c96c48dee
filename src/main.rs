use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use looksee::cli::Cli;
use looksee::commands;
use looksee::config::{self, Config};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if std::io::stdout().is_terminal() {
        config.detect_width(config::terminal_width);
    } else {
        // Escape sequences only make sense on a terminal.
        config.color = false;
    }

    let output = commands::run(cli.command, &config)?;
    print!("{output}");
    Ok(())
}
