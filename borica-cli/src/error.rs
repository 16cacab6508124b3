//! Error types for the command-line tool.

use std::path::PathBuf;

/// Errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The configuration file could not be read.
    #[error("cannot read config `{}`: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or misses required keys.
    #[error("invalid config `{}`: {source}", path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// The command needs a `[certificate]` section that is not configured.
    #[error("no gateway certificate configured, add a [certificate] section")]
    MissingCertificate,

    /// Reading the response payload from standard input failed.
    #[error("cannot read response from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// Writing the result to standard output failed.
    #[error("cannot write output: {0}")]
    Stdout(#[source] std::io::Error),

    /// Codec, key or signature failure.
    #[error(transparent)]
    Borica(#[from] borica::BoricaError),

    /// Rendering the output failed.
    #[error("cannot render output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } | Self::Config { .. } | Self::MissingCertificate => 78,
            Self::Stdin(_) | Self::Stdout(_) => 74,
            Self::Borica(_) | Self::Json(_) => 1,
        }
    }
}
