//! Merchant and gateway certificate configuration.
//!
//! Both types deserialize from any `serde` format. Key material is referenced
//! through [`KeySource`], so a configuration file can either point at a PEM
//! file or embed the PEM text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayHosts, GatewayMode};
use crate::key::KeySource;
use crate::proto::{Currency, Language, ProtocolVersion, TerminalId};

/// Everything needed to build and sign requests for one merchant terminal.
///
/// # Example
///
/// ```rust
/// use borica::{KeySource, MerchantConfig};
///
/// let config: MerchantConfig = serde_json::from_str(r#"{
///     "terminal_id": "12345678",
///     "private_key": { "file": "/etc/borica/merchant.key" },
///     "language": "bg",
///     "mode": "test"
/// }"#)?;
/// assert!(matches!(config.private_key, KeySource::File(_)));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantConfig {
    /// Terminal ID assigned by the gateway.
    pub terminal_id: TerminalId,

    /// The merchant's RSA private key.
    pub private_key: KeySource,

    /// Password for an encrypted private key.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Payment page language.
    #[serde(default)]
    pub language: Language,

    /// Production or test gateway.
    #[serde(default)]
    pub mode: GatewayMode,

    /// Gateway base URLs. Defaults to the public Borica hosts.
    #[serde(default)]
    pub hosts: GatewayHosts,

    /// Currency used when a request does not set one.
    #[serde(default)]
    pub currency: Currency,

    /// Default protocol version, exposed as
    /// [`GatewayRequest::protocol_version`](crate::GatewayRequest::protocol_version).
    #[serde(default)]
    pub protocol_version: ProtocolVersion,
}

impl MerchantConfig {
    /// Creates a configuration with defaults for everything but the terminal
    /// and the key.
    #[must_use]
    pub fn new(terminal_id: TerminalId, private_key: KeySource) -> Self {
        Self {
            terminal_id,
            private_key,
            password: None,
            language: Language::default(),
            mode: GatewayMode::default(),
            hosts: GatewayHosts::default(),
            currency: Currency::default(),
            protocol_version: ProtocolVersion::default(),
        }
    }

    /// Sets the private key password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the payment page language.
    #[must_use]
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Selects the gateway environment.
    #[must_use]
    pub const fn with_mode(mut self, mode: GatewayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the gateway base URLs.
    #[must_use]
    pub fn with_hosts(mut self, hosts: GatewayHosts) -> Self {
        self.hosts = hosts;
        self
    }

    /// Sets the protocol version used by the request shortcuts.
    #[must_use]
    pub const fn with_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = version;
        self
    }
}

impl fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("terminal_id", &self.terminal_id)
            .field("private_key", &self.private_key)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("mode", &self.mode)
            .field("hosts", &self.hosts)
            .field("currency", &self.currency)
            .field("protocol_version", &self.protocol_version)
            .finish()
    }
}

/// Location of the gateway's public certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateConfig {
    /// The certificate (or bare public key) in PEM form.
    pub certificate: KeySource,
}

impl CertificateConfig {
    /// Creates a configuration for `certificate`.
    #[must_use]
    pub const fn new(certificate: KeySource) -> Self {
        Self { certificate }
    }
}
