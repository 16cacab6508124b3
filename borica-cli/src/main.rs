//! `borica` command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Print a signed registration URL
//! borica register --amount 12.50 --order-id 1001 --description "Order 1001"
//!
//! # Use another config file and protocol 2.0
//! borica --config /etc/borica.toml register --amount 1 --order-id 7 \
//!     --description "Ticketed" --protocol 2.0 --ticket ABC123
//!
//! # Check a gateway response
//! borica parse "$EBORICA"
//! ```
//!
//! # Environment Variables
//!
//! - `BORICA_CONFIG` - Path to TOML configuration file (default: `borica.toml`)
//! - `BORICA_DEBUG` - Force the test (`1`) or production (`0`) gateway
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use borica_cli::{Cli, CliConfig, CliError};

fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        tracing::error!("{e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = CliConfig::load_from(&cli.config)?;
    tracing::debug!(
        config = %cli.config.display(),
        terminal_id = %config.merchant.terminal_id,
        mode = ?config.merchant.mode,
        "loaded configuration"
    );

    let output = borica_cli::run(&cli.command, &config)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").map_err(CliError::Stdout)?;
    Ok(())
}
