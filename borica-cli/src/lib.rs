//! Command-line front end for the `borica` gateway codec.
//!
//! Reads a merchant configuration file, then either prints a signed gateway
//! request URL or decodes a gateway response as JSON.
//!
//! # Modules
//!
//! - [`commands`] - Argument parsing and command dispatch
//! - [`config`] - TOML configuration with environment variable expansion
//! - [`error`] - Command-line error types

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{Cli, Command, run};
pub use config::CliConfig;
pub use error::CliError;
