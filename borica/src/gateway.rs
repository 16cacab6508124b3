//! Gateway endpoints and request URL assembly.
//!
//! The final request is a plain GET:
//!
//! ```text
//! {host}{endpoint}?eBorica={urlencode(base64(message ‖ signature))}
//! ```
//!
//! The host pair is configuration; [`GatewayMode`] picks one of the two.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::BoricaError;
use crate::proto::{EBORICA_PARAM, encode_message};

/// Production gateway base URL.
pub const PRODUCTION_URL: &str = "https://gate.borica.bg/boreps/";

/// Test gateway base URL.
pub const TEST_URL: &str = "https://gatet.borica.bg/boreps/";

/// Which gateway environment requests are addressed to.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    /// Live gateway.
    #[default]
    Production,
    /// Test gateway.
    Test,
}

impl GatewayMode {
    /// Maps the classic "debug" flag to a mode.
    #[must_use]
    pub const fn from_debug(debug: bool) -> Self {
        if debug { Self::Test } else { Self::Production }
    }
}

/// The production/test host pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayHosts {
    /// Base URL used in [`GatewayMode::Production`].
    pub production: Url,
    /// Base URL used in [`GatewayMode::Test`].
    pub test: Url,
}

impl GatewayHosts {
    /// Builds a host pair from two base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] if either URL does not parse.
    pub fn new(production: &str, test: &str) -> Result<Self, BoricaError> {
        let parse = |field: &'static str, raw: &str| {
            Url::parse(raw).map_err(|e| BoricaError::invalid(field, e.to_string()))
        };
        Ok(Self {
            production: parse("production_url", production)?,
            test: parse("test_url", test)?,
        })
    }

    /// Returns the base URL for `mode`.
    #[must_use]
    pub const fn select(&self, mode: GatewayMode) -> &Url {
        match mode {
            GatewayMode::Production => &self.production,
            GatewayMode::Test => &self.test,
        }
    }
}

impl Default for GatewayHosts {
    fn default() -> Self {
        Self {
            production: Url::parse(PRODUCTION_URL).expect("static production URL"),
            test: Url::parse(TEST_URL).expect("static test URL"),
        }
    }
}

/// Gateway path a request is sent to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `registerTransaction`.
    RegisterTransaction,
    /// `transactionStatusReport`.
    TransactionStatusReport,
    /// `manageTransaction`, shared by delayed-authorization and reversal operations.
    ManageTransaction,
}

impl Endpoint {
    /// Returns the path segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterTransaction => "registerTransaction",
            Self::TransactionStatusReport => "transactionStatusReport",
            Self::ManageTransaction => "manageTransaction",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns signed messages into gateway request URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEncoder {
    base: Url,
}

impl UrlEncoder {
    /// Creates an encoder for the host selected by `mode`.
    #[must_use]
    pub fn new(hosts: &GatewayHosts, mode: GatewayMode) -> Self {
        let mut base = hosts.select(mode).clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    /// Returns the selected gateway base URL.
    #[must_use]
    pub const fn gateway_url(&self) -> &Url {
        &self.base
    }

    /// Builds the request URL carrying `signed` in the `eBorica` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] if the endpoint cannot be
    /// joined onto the configured base URL.
    pub fn encode(&self, endpoint: Endpoint, signed: &[u8]) -> Result<String, BoricaError> {
        let mut url = self
            .base
            .join(endpoint.as_str())
            .map_err(|e| BoricaError::invalid("gateway_url", e.to_string()))?;
        url.query_pairs_mut()
            .clear()
            .append_pair(EBORICA_PARAM, &encode_message(signed));
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_selects_test_host() {
        let hosts = GatewayHosts::default();
        let prod = UrlEncoder::new(&hosts, GatewayMode::from_debug(false));
        let test = UrlEncoder::new(&hosts, GatewayMode::from_debug(true));
        assert_eq!(prod.gateway_url().as_str(), PRODUCTION_URL);
        assert_eq!(test.gateway_url().as_str(), TEST_URL);
    }

    #[test]
    fn test_encode_shape() {
        let encoder = UrlEncoder::new(&GatewayHosts::default(), GatewayMode::Test);
        let url = encoder
            .encode(Endpoint::ManageTransaction, &[0xfb, 0xff])
            .unwrap();
        assert_eq!(
            url,
            "https://gatet.borica.bg/boreps/manageTransaction?eBorica=%2B%2F8%3D"
        );
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let hosts = GatewayHosts::new("https://pay.example/boreps", "https://test.example/").unwrap();
        let encoder = UrlEncoder::new(&hosts, GatewayMode::Production);
        let url = encoder.encode(Endpoint::RegisterTransaction, b"x").unwrap();
        assert!(url.starts_with("https://pay.example/boreps/registerTransaction?eBorica="));
    }

    #[test]
    fn test_invalid_host() {
        let err = GatewayHosts::new("not a url", TEST_URL).unwrap_err();
        assert!(matches!(
            err,
            BoricaError::InvalidParameter {
                field: "production_url",
                ..
            }
        ));
    }

    #[test]
    fn test_mode_serde() {
        let mode: GatewayMode = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(mode, GatewayMode::Test);
    }
}
