//! Command-line configuration.
//!
//! Loads the merchant setup from a TOML file with support for environment
//! variable expansion in string values. Variables use `$VAR` or `${VAR}`
//! syntax, so the key password can stay out of the file.
//!
//! # Example Configuration
//!
//! ```toml
//! [merchant]
//! terminal_id = "12345678"
//! private_key = { file = "keys/merchant.key" }
//! password = "$BORICA_KEY_PASSWORD"
//! language = "BG"
//! mode = "test"
//! protocol_version = "1.1"
//!
//! [certificate]
//! certificate = { file = "keys/gateway.crt" }
//! ```
//!
//! Relative key paths are resolved against the directory of the config file.
//!
//! # Environment Variables
//!
//! - `BORICA_CONFIG` - Path to the configuration file (default: `borica.toml`)
//! - `BORICA_DEBUG` - `1`/`true` selects the test gateway, `0`/`false` production
//! - Secrets referenced by `$VAR` in the config file

use std::path::Path;

use borica::{CertificateConfig, GatewayMode, KeySource, MerchantConfig};
use serde::Deserialize;

use crate::error::CliError;

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "borica.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// The merchant terminal and its signing key.
    pub merchant: MerchantConfig,

    /// The gateway certificate; only needed to check responses.
    #[serde(default)]
    pub certificate: Option<CertificateConfig>,
}

impl CliConfig {
    /// Loads configuration from `path`.
    ///
    /// String values are expanded from the process environment before
    /// parsing, and `BORICA_DEBUG` overrides the configured gateway mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Self::parse(&content, path, |name| std::env::var(name).ok())?;

        if let Some(mode) = std::env::var("BORICA_DEBUG").ok().as_deref().and_then(debug_mode) {
            config.merchant.mode = mode;
        }

        Ok(config)
    }

    /// Parses `content` with variables resolved through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the expanded text is not a valid
    /// configuration.
    pub fn parse(
        content: &str,
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CliError> {
        let expanded = expand_env_vars(content, &lookup);
        let mut config: Self = toml::from_str(&expanded).map_err(|source| CliError::Config {
            path: path.to_owned(),
            source,
        })?;

        let password_unresolved = raw_password(content)
            .is_some_and(|raw| expand_tracking(&raw, &lookup).1);
        if password_unresolved
            || config
                .merchant
                .password
                .as_deref()
                .is_some_and(|p| p.trim().is_empty())
        {
            tracing::warn!("key password not resolved (missing env var?), ignoring it");
            config.merchant.password = None;
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        resolve_relative(&mut config.merchant.private_key, base);
        if let Some(certificate) = config.certificate.as_mut() {
            resolve_relative(&mut certificate.certificate, base);
        }

        Ok(config)
    }
}

/// Interprets a `BORICA_DEBUG` value.
fn debug_mode(value: &str) -> Option<GatewayMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(GatewayMode::Test),
        "0" | "false" | "no" => Some(GatewayMode::Production),
        _ => None,
    }
}

fn resolve_relative(source: &mut KeySource, base: &Path) {
    if let KeySource::File(path) = source {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}

/// The `merchant.password` value as written, before expansion.
fn raw_password(content: &str) -> Option<String> {
    let table: toml::Table = toml::from_str(content).ok()?;
    table
        .get("merchant")?
        .get("password")?
        .as_str()
        .map(str::to_owned)
}

/// Expands `$VAR` and `${VAR}` patterns in a string.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    expand_tracking(input, lookup).0
}

/// Like [`expand_env_vars`], also reporting whether any named variable was
/// left unresolved.
fn expand_tracking(input: &str, lookup: impl Fn(&str) -> Option<String>) -> (String, bool) {
    let mut unresolved = false;
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        let value = if var_name.is_empty() {
            None
        } else {
            lookup(&var_name)
        };
        unresolved |= value.is_none() && !var_name.is_empty();
        match value {
            Some(value) => result.push_str(&value),
            None if braced => {
                result.push_str("${");
                result.push_str(&var_name);
                if !var_name.is_empty() {
                    result.push('}');
                }
            }
            None => {
                result.push('$');
                result.push_str(&var_name);
            }
        }
    }

    (result, unresolved)
}
