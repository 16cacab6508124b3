//! Gateway response decoding and verification.
//!
//! A response is base64 over a 56-byte ASCII header followed by the gateway's
//! 128-byte signature. The signature covers everything before it. Parsing is strict about the layout and lenient about
//! the signature: a bad signature is reported through
//! [`GatewayResponse::verification`], never as an error.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::amount::Amount;
use crate::crypto::{SIGNATURE_LEN, Verification, Verifier};
use crate::error::BoricaError;
use crate::key::{FileKeyProvider, KeyMaterialProvider, KeySource};
use crate::proto::response_layout as layout;
use crate::proto::{TransactionCode, decode_message};
use crate::timestamp::GatewayTimestamp;

/// Response code the gateway uses for an approved transaction.
pub const SUCCESS_CODE: &str = "00";

/// Decodes gateway responses and checks their signatures.
///
/// The certificate is loaded once, when the parser is created. If it cannot
/// be loaded every parsed response carries [`Verification::Error`] with the
/// reason, so the caller still sees the decoded fields.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    verifier: Result<Arc<Verifier>, String>,
}

impl ResponseParser {
    /// Loads the gateway certificate from `certificate` using the default provider.
    #[must_use]
    pub fn new(certificate: &KeySource) -> Self {
        Self::with_provider(certificate, &FileKeyProvider)
    }

    /// Loads the gateway certificate through `provider`.
    #[must_use]
    pub fn with_provider(certificate: &KeySource, provider: &dyn KeyMaterialProvider) -> Self {
        let verifier = Verifier::load(certificate, provider).map(Arc::new).map_err(|e| {
            #[cfg(feature = "telemetry")]
            tracing::warn!(error = %e, "gateway certificate unavailable");
            e.to_string()
        });
        Self { verifier }
    }

    /// Uses an already-loaded verifier.
    #[must_use]
    pub fn with_verifier(verifier: Verifier) -> Self {
        Self {
            verifier: Ok(Arc::new(verifier)),
        }
    }

    /// Whether the certificate loaded successfully.
    #[must_use]
    pub const fn has_verifier(&self) -> bool {
        self.verifier.is_ok()
    }

    /// Decodes and verifies a base64 response.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::Base64`] if `message` is not base64, and
    /// [`BoricaError::MalformedResponse`] if the decoded payload is shorter
    /// than the fixed layout or a header field is not in the expected format.
    pub fn parse(&self, message: &str) -> Result<GatewayResponse, BoricaError> {
        let decoded = decode_message(message)?;
        if decoded.len() < layout::MIN_LEN {
            return Err(BoricaError::MalformedResponse(format!(
                "decoded payload is {} bytes, expected at least {}",
                decoded.len(),
                layout::MIN_LEN
            )));
        }

        let header = std::str::from_utf8(&decoded[..layout::HEADER_LEN])
            .ok()
            .filter(|h| h.is_ascii())
            .ok_or_else(|| BoricaError::MalformedResponse("header is not ASCII".to_owned()))?;
        let field = |(offset, len): (usize, usize)| &header[offset..offset + len];

        // The signature is always the trailing block, whatever the payload length.
        let signature = decoded[decoded.len() - SIGNATURE_LEN..].to_vec();
        let verification = match &self.verifier {
            Ok(verifier) => verifier.verify(&decoded),
            Err(reason) => Verification::Error(reason.clone()),
        };

        let response = GatewayResponse {
            transaction_code: field(layout::TRANSACTION_CODE).to_owned(),
            transaction_time: field(layout::TRANSACTION_TIME).parse()?,
            amount: Amount::from_field(field(layout::AMOUNT))?,
            terminal_id: field(layout::TERMINAL_ID).to_owned(),
            order_id: field(layout::ORDER_ID).trim().to_owned(),
            response_code: field(layout::RESPONSE_CODE).to_owned(),
            protocol_version: field(layout::PROTOCOL_VERSION).to_owned(),
            signature,
            verification,
        };

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            code = %response.transaction_code,
            response_code = %response.response_code,
            order_id = %response.order_id,
            verification = %response.verification,
            "parsed gateway response"
        );

        Ok(response)
    }
}

/// A decoded gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayResponse {
    transaction_code: String,
    #[serde(serialize_with = "serialize_timestamp")]
    transaction_time: GatewayTimestamp,
    amount: Amount,
    terminal_id: String,
    order_id: String,
    response_code: String,
    protocol_version: String,
    #[serde(skip)]
    signature: Vec<u8>,
    verification: Verification,
}

fn serialize_timestamp<S: serde::Serializer>(
    value: &GatewayTimestamp,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl GatewayResponse {
    /// The two-character transaction code.
    #[must_use]
    pub fn transaction_code(&self) -> &str {
        &self.transaction_code
    }

    /// The transaction code, if it is one this crate knows.
    #[must_use]
    pub fn known_transaction_code(&self) -> Option<TransactionCode> {
        TransactionCode::from_str(&self.transaction_code).ok()
    }

    /// The raw 14-digit transaction time.
    #[must_use]
    pub fn transaction_timestamp(&self) -> String {
        self.transaction_time.to_string()
    }

    /// The transaction time as a calendar date-time.
    #[must_use]
    pub const fn transaction_time(&self) -> NaiveDateTime {
        self.transaction_time.as_datetime()
    }

    /// The amount in major units.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount.to_decimal()
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn amount_minor(&self) -> u64 {
        self.amount.minor_units()
    }

    /// The merchant terminal ID.
    #[must_use]
    pub fn terminal_id(&self) -> &str {
        &self.terminal_id
    }

    /// The order ID with padding removed.
    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// The two-character gateway response code.
    #[must_use]
    pub fn response_code(&self) -> &str {
        &self.response_code
    }

    /// The protocol version literal echoed by the gateway.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// The raw 128-byte signature.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The outcome of signature verification.
    #[must_use]
    pub const fn verification(&self) -> &Verification {
        &self.verification
    }

    /// Whether the signature verified.
    #[must_use]
    pub const fn signature_ok(&self) -> bool {
        self.verification.is_valid()
    }

    /// Whether the gateway approved the transaction.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.response_code == SUCCESS_CODE
    }

    /// Whether the gateway declined the transaction.
    #[must_use]
    pub fn not_successful(&self) -> bool {
        !self.is_successful()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoricaErrorKind;
    use crate::proto::encode_message;

    const HEADER: &[u8; 56] = b"1020261018120000000000000100123456781              001.1";

    fn unverified() -> ResponseParser {
        ResponseParser::new(&KeySource::Inline("no certificate here".to_owned()))
    }

    fn payload(header: &[u8]) -> String {
        let mut bytes = header.to_vec();
        bytes.extend_from_slice(&[0x5a; SIGNATURE_LEN]);
        encode_message(&bytes)
    }

    #[test]
    fn test_fields_at_fixed_offsets() {
        let response = unverified().parse(&payload(HEADER)).unwrap();
        assert_eq!(response.transaction_code(), "10");
        assert_eq!(
            response.known_transaction_code(),
            Some(TransactionCode::Register)
        );
        assert_eq!(response.transaction_timestamp(), "20261018120000");
        assert_eq!(response.amount_minor(), 100);
        assert_eq!(response.amount(), Decimal::new(100, 2));
        assert_eq!(response.terminal_id(), "12345678");
        assert_eq!(response.order_id(), "1");
        assert_eq!(response.response_code(), "00");
        assert_eq!(response.protocol_version(), "1.1");
        assert_eq!(response.signature(), &[0x5a; SIGNATURE_LEN][..]);
        assert!(response.is_successful());
        assert!(!response.not_successful());
    }

    #[test]
    fn test_signature_is_trailing_block_of_longer_payload() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(b"extra");
        bytes.extend_from_slice(&[0x33; SIGNATURE_LEN]);
        let response = unverified().parse(&encode_message(&bytes)).unwrap();
        assert_eq!(response.signature(), &[0x33; SIGNATURE_LEN][..]);
        assert_eq!(response.order_id(), "1");
    }

    #[test]
    fn test_missing_certificate_is_flagged_not_fatal() {
        let parser = unverified();
        assert!(!parser.has_verifier());
        let response = parser.parse(&payload(HEADER)).unwrap();
        assert!(!response.signature_ok());
        assert!(matches!(response.verification(), Verification::Error(_)));
    }

    #[test]
    fn test_short_payload() {
        let err = unverified().parse(&encode_message(HEADER)).unwrap_err();
        assert_eq!(err.kind(), BoricaErrorKind::MalformedResponse);
    }

    #[test]
    fn test_not_base64() {
        let err = unverified().parse("@@@@").unwrap_err();
        assert!(matches!(err, BoricaError::Base64(_)));
        assert_eq!(err.kind(), BoricaErrorKind::MalformedResponse);
    }

    #[test]
    fn test_non_numeric_amount() {
        let mut header = *HEADER;
        header[20] = b'x';
        let err = unverified().parse(&payload(&header)).unwrap_err();
        assert_eq!(err.kind(), BoricaErrorKind::MalformedResponse);
    }

    #[test]
    fn test_declined_response() {
        let mut header = *HEADER;
        header[51..53].copy_from_slice(b"05");
        let response = unverified().parse(&payload(&header)).unwrap();
        assert!(response.not_successful());
    }

    #[test]
    fn test_serializes_without_signature() {
        let response = unverified().parse(&payload(HEADER)).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["transaction_time"], "20261018120000");
        assert_eq!(json["amount"], "1.00");
        assert!(json.get("signature").is_none());
    }
}
