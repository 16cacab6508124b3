//! Merchant-facing entry points.
//!
//! [`GatewayRequest`] owns everything the request side needs for one
//! terminal: the message layout, the signing key and the gateway URL. Each
//! operation composes the base message, signs it and returns the final URL.
//! [`Borica`] pairs it with a [`ResponseParser`] behind a single
//! [`KeyMaterialProvider`].

use std::sync::Arc;

use url::Url;

use crate::config::{CertificateConfig, MerchantConfig};
use crate::crypto::Signer;
use crate::error::BoricaError;
use crate::gateway::UrlEncoder;
use crate::key::{FileKeyProvider, KeyMaterialProvider};
use crate::proto::{Currency, ProtocolVersion};
use crate::request::{MessageBuilder, Operation, TransactionRequest, TransactionRequestBuilder};
use crate::response::{GatewayResponse, ResponseParser};
use crate::timestamp::GatewayTimestamp;

/// Builds signed request URLs for one merchant terminal.
#[derive(Debug)]
pub struct GatewayRequest {
    messages: MessageBuilder,
    signer: Signer,
    encoder: UrlEncoder,
    currency: Currency,
    version: ProtocolVersion,
}

impl GatewayRequest {
    /// Loads the merchant key from disk or inline PEM.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::KeyMaterial`] if the key cannot be read, parsed
    /// or decrypted, or is not a 1024-bit RSA key.
    pub fn new(config: &MerchantConfig) -> Result<Self, BoricaError> {
        Self::with_provider(config, &FileKeyProvider)
    }

    /// Loads the merchant key through `provider`.
    ///
    /// # Errors
    ///
    /// See [`GatewayRequest::new`].
    pub fn with_provider(
        config: &MerchantConfig,
        provider: &dyn KeyMaterialProvider,
    ) -> Result<Self, BoricaError> {
        let signer = Signer::load(&config.private_key, config.password.as_deref(), provider)?;

        #[cfg(feature = "telemetry")]
        tracing::info!(
            terminal_id = %config.terminal_id,
            mode = ?config.mode,
            "merchant key loaded"
        );

        Ok(Self::from_parts(config, signer))
    }

    /// Assembles a request side from a configuration and an already-loaded key.
    #[must_use]
    pub fn from_parts(config: &MerchantConfig, signer: Signer) -> Self {
        Self {
            messages: MessageBuilder::new(config.terminal_id.clone(), config.language),
            signer,
            encoder: UrlEncoder::new(&config.hosts, config.mode),
            currency: config.currency,
            version: config.protocol_version,
        }
    }

    /// The merchant's configured protocol version.
    ///
    /// The operation methods take the version per call; this is the value to
    /// pass when the caller has no preference.
    #[must_use]
    pub const fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    /// The selected gateway base URL.
    #[must_use]
    pub const fn gateway_url(&self) -> &Url {
        self.encoder.gateway_url()
    }

    /// The message layout bound to this terminal.
    #[must_use]
    pub const fn message_builder(&self) -> &MessageBuilder {
        &self.messages
    }

    /// Starts a transaction request preset with the merchant's currency.
    ///
    /// # Errors
    ///
    /// Never fails for a currency taken from a valid configuration.
    pub fn transaction(&self) -> Result<TransactionRequestBuilder, BoricaError> {
        TransactionRequest::builder().currency(self.currency.as_str())
    }

    /// URL registering a new payment.
    ///
    /// # Errors
    ///
    /// Fails if the ticket is longer than six bytes or signing fails.
    pub fn register(
        &self,
        request: &TransactionRequest,
        version: ProtocolVersion,
        one_time_ticket: Option<&str>,
    ) -> Result<String, BoricaError> {
        let operation = Operation::Register {
            one_time_ticket: one_time_ticket.map(str::to_owned),
        };
        self.url_for(&operation, request, version, GatewayTimestamp::now())
    }

    /// URL asking for the status of a payment.
    ///
    /// # Errors
    ///
    /// Fails if signing fails.
    pub fn status(
        &self,
        request: &TransactionRequest,
        version: ProtocolVersion,
    ) -> Result<String, BoricaError> {
        self.url_for(&Operation::Status, request, version, GatewayTimestamp::now())
    }

    /// URL registering a delayed authorization.
    ///
    /// # Errors
    ///
    /// Fails if signing fails.
    pub fn register_delayed(
        &self,
        request: &TransactionRequest,
        version: ProtocolVersion,
    ) -> Result<String, BoricaError> {
        self.url_for(&Operation::RegisterDelayed, request, version, GatewayTimestamp::now())
    }

    /// URL completing a delayed authorization.
    ///
    /// # Errors
    ///
    /// Fails if signing fails.
    pub fn complete_delayed(
        &self,
        request: &TransactionRequest,
        version: ProtocolVersion,
    ) -> Result<String, BoricaError> {
        self.url_for(&Operation::CompleteDelayed, request, version, GatewayTimestamp::now())
    }

    /// URL reversing a delayed authorization.
    ///
    /// # Errors
    ///
    /// Fails if signing fails.
    pub fn reverse_delayed(
        &self,
        request: &TransactionRequest,
        version: ProtocolVersion,
    ) -> Result<String, BoricaError> {
        self.url_for(&Operation::ReverseDelayed, request, version, GatewayTimestamp::now())
    }

    /// URL reversing a payment.
    ///
    /// # Errors
    ///
    /// Fails if signing fails.
    pub fn reverse(
        &self,
        request: &TransactionRequest,
        version: ProtocolVersion,
    ) -> Result<String, BoricaError> {
        self.url_for(&Operation::Reverse, request, version, GatewayTimestamp::now())
    }

    /// Composes and signs the message for `operation`.
    ///
    /// # Errors
    ///
    /// Fails if the message cannot be composed or signing fails.
    pub fn signed_message(
        &self,
        operation: &Operation,
        request: &TransactionRequest,
        version: ProtocolVersion,
        timestamp: GatewayTimestamp,
    ) -> Result<Vec<u8>, BoricaError> {
        let message = self.messages.build(operation, request, version, timestamp)?;
        self.signer.sign(&message)
    }

    /// Builds the request URL for `operation` at a fixed `timestamp`.
    ///
    /// # Errors
    ///
    /// Fails if the message cannot be composed or signing fails.
    pub fn url_for(
        &self,
        operation: &Operation,
        request: &TransactionRequest,
        version: ProtocolVersion,
        timestamp: GatewayTimestamp,
    ) -> Result<String, BoricaError> {
        let signed = self.signed_message(operation, request, version, timestamp)?;
        self.encoder.encode(operation.endpoint(), &signed)
    }
}

/// The request builder and the response parser for one merchant.
///
/// ```rust,no_run
/// use borica::{Borica, CertificateConfig, KeySource, MerchantConfig, ProtocolVersion};
///
/// let merchant = MerchantConfig::new(
///     "12345678".parse()?,
///     KeySource::File("merchant.key".into()),
/// );
/// let certificate = CertificateConfig::new(KeySource::File("gateway.crt".into()));
/// let borica = Borica::new(&merchant, &certificate)?;
///
/// let request = borica
///     .request()
///     .transaction()?
///     .amount("9.99")?
///     .order_id("1001")?
///     .description("Subscription")?
///     .build()?;
/// let url = borica.request().register(&request, ProtocolVersion::V1_1, None)?;
/// println!("{url}");
/// # Ok::<(), borica::BoricaError>(())
/// ```
#[derive(Debug)]
pub struct Borica {
    request: GatewayRequest,
    parser: ResponseParser,
}

impl Borica {
    /// Creates both sides, reading key material with [`FileKeyProvider`].
    ///
    /// # Errors
    ///
    /// Fails if the merchant key cannot be loaded. An unreadable certificate
    /// is not an error here; see [`ResponseParser`].
    pub fn new(
        merchant: &MerchantConfig,
        certificate: &CertificateConfig,
    ) -> Result<Self, BoricaError> {
        Self::with_provider(merchant, certificate, Arc::new(FileKeyProvider))
    }

    /// Creates both sides, reading key material through `provider`.
    ///
    /// # Errors
    ///
    /// See [`Borica::new`].
    pub fn with_provider(
        merchant: &MerchantConfig,
        certificate: &CertificateConfig,
        provider: Arc<dyn KeyMaterialProvider>,
    ) -> Result<Self, BoricaError> {
        Ok(Self {
            request: GatewayRequest::with_provider(merchant, provider.as_ref())?,
            parser: ResponseParser::with_provider(&certificate.certificate, provider.as_ref()),
        })
    }

    /// The request side.
    #[must_use]
    pub const fn request(&self) -> &GatewayRequest {
        &self.request
    }

    /// The response side.
    #[must_use]
    pub const fn parser(&self) -> &ResponseParser {
        &self.parser
    }

    /// Parses a gateway response.
    ///
    /// # Errors
    ///
    /// See [`ResponseParser::parse`].
    pub fn response(&self, message: &str) -> Result<GatewayResponse, BoricaError> {
        self.parser.parse(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoricaErrorKind, KeyMaterialError};
    use crate::gateway::GatewayMode;
    use crate::key::KeySource;
    use crate::proto::Language;

    const MERCHANT_KEY: &str = include_str!("../tests/fixtures/merchant.key");

    fn config() -> MerchantConfig {
        MerchantConfig::new(
            "12345678".parse().unwrap(),
            KeySource::Inline(MERCHANT_KEY.to_owned()),
        )
        .with_language(Language::Bg)
        .with_mode(GatewayMode::Test)
    }

    fn request(client: &GatewayRequest) -> TransactionRequest {
        client
            .transaction()
            .and_then(|b| b.amount("1.5"))
            .and_then(|b| b.order_id("77"))
            .and_then(|b| b.description("unit test"))
            .and_then(TransactionRequestBuilder::build)
            .unwrap()
    }

    #[test]
    fn test_url_prefix_and_path() {
        let client = GatewayRequest::new(&config()).unwrap();
        let url = client
            .status(&request(&client), ProtocolVersion::V1_1)
            .unwrap();
        assert!(url.starts_with("https://gatet.borica.bg/boreps/transactionStatusReport?eBorica="));
        assert_eq!(client.gateway_url().as_str(), "https://gatet.borica.bg/boreps/");
    }

    #[test]
    fn test_configured_protocol_version() {
        let client = GatewayRequest::new(&config()).unwrap();
        assert_eq!(client.protocol_version(), ProtocolVersion::V1_1);

        let client =
            GatewayRequest::new(&config().with_protocol_version(ProtocolVersion::V2_0)).unwrap();
        assert_eq!(client.protocol_version(), ProtocolVersion::V2_0);
        let url = client
            .register(&request(&client), client.protocol_version(), Some("ABC"))
            .unwrap();
        assert!(url.contains("registerTransaction?eBorica="));
    }

    #[test]
    fn test_signed_message_layout() {
        let client = GatewayRequest::new(&config()).unwrap();
        let timestamp: GatewayTimestamp = "20261018120000".parse().unwrap();
        let signed = client
            .signed_message(
                &Operation::Reverse,
                &request(&client),
                ProtocolVersion::V1_1,
                timestamp,
            )
            .unwrap();
        assert_eq!(signed.len(), 184 + crate::crypto::SIGNATURE_LEN);
        assert!(signed.starts_with(b"4020261018120000000000000150"));
        assert_eq!(&signed[176..184], b"BG1.1EUR");
    }

    #[test]
    fn test_fixed_timestamp_is_deterministic() {
        let client = GatewayRequest::new(&config()).unwrap();
        let timestamp: GatewayTimestamp = "20261018120000".parse().unwrap();
        let request = request(&client);
        let a = client
            .url_for(&Operation::Status, &request, ProtocolVersion::V2_0, timestamp)
            .unwrap();
        let b = client
            .url_for(&Operation::Status, &request, ProtocolVersion::V2_0, timestamp)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_key_file() {
        let config = MerchantConfig::new(
            "12345678".parse().unwrap(),
            KeySource::File("/nonexistent/merchant.key".into()),
        );
        let err = GatewayRequest::new(&config).unwrap_err();
        assert!(matches!(
            err,
            BoricaError::KeyMaterial(KeyMaterialError::Io { .. })
        ));
        assert_eq!(err.kind(), BoricaErrorKind::KeyMaterial);
    }

    #[test]
    fn test_facade_without_certificate_still_parses() {
        let borica = Borica::new(
            &config(),
            &CertificateConfig::new(KeySource::File("/nonexistent/gateway.crt".into())),
        )
        .unwrap();
        assert!(!borica.parser().has_verifier());
    }
}
