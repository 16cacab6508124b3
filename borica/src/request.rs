//! Transaction requests and base-message composition.
//!
//! [`TransactionRequest`] holds the per-transaction fields. Its builder
//! validates each value as it is set, so an invalid amount or an oversized
//! order ID is reported at the call that supplied it. [`MessageBuilder`] then
//! lays the fields out in the fixed-width wire format for a given
//! [`Operation`] and [`ProtocolVersion`].

use rust_decimal::Decimal;

use crate::amount::Amount;
use crate::error::BoricaError;
use crate::gateway::Endpoint;
use crate::proto::{
    Currency, DESCRIPTION_WIDTH, Language, ONE_TIME_TICKET_WIDTH, ORDER_ID_WIDTH,
    ProtocolVersion, TerminalId, TransactionCode, pad_right,
};
use crate::timestamp::GatewayTimestamp;

/// An immutable, validated set of transaction fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    amount: Amount,
    order_id: String,
    description: String,
    currency: Currency,
}

impl TransactionRequest {
    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> TransactionRequestBuilder {
        TransactionRequestBuilder::default()
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns the order ID as given.
    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Returns the description as given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// The 12-digit amount field.
    #[must_use]
    pub fn formatted_amount(&self) -> String {
        self.amount.to_field()
    }

    /// The 15-byte, space-padded order ID field.
    #[must_use]
    pub fn formatted_order_id(&self) -> String {
        pad_right(&self.order_id, ORDER_ID_WIDTH)
    }

    /// The 125-byte, space-padded description field.
    #[must_use]
    pub fn formatted_description(&self) -> String {
        pad_right(&self.description, DESCRIPTION_WIDTH)
    }
}

/// Fluent, fail-fast builder for [`TransactionRequest`].
///
/// ```rust
/// use borica::TransactionRequest;
///
/// let request = TransactionRequest::builder()
///     .amount("12.50")?
///     .order_id("100042")?
///     .description("Order #100042")?
///     .currency("bgn")?
///     .build()?;
/// assert_eq!(request.formatted_amount(), "000000001250");
/// # Ok::<(), borica::BoricaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionRequestBuilder {
    amount: Option<Amount>,
    order_id: Option<String>,
    description: Option<String>,
    currency: Currency,
}

impl TransactionRequestBuilder {
    /// Sets the amount from its decimal text form (`"12.50"`).
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] if `amount` is not a number.
    pub fn amount(mut self, amount: &str) -> Result<Self, BoricaError> {
        self.amount = Some(amount.parse()?);
        Ok(self)
    }

    /// Sets the amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] if the value cannot be
    /// represented in minor units.
    pub fn amount_decimal(mut self, amount: Decimal) -> Result<Self, BoricaError> {
        self.amount = Some(Amount::from_decimal(amount)?);
        Ok(self)
    }

    /// Sets the order ID (1 to 15 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::LengthViolation`] if the ID is empty or too long.
    pub fn order_id(mut self, order_id: impl Into<String>) -> Result<Self, BoricaError> {
        let order_id = order_id.into();
        BoricaError::check_length("order_id", &order_id, 1, ORDER_ID_WIDTH)?;
        self.order_id = Some(order_id);
        Ok(self)
    }

    /// Sets the description (1 to 125 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::LengthViolation`] if the description is empty or
    /// too long.
    pub fn description(mut self, description: impl Into<String>) -> Result<Self, BoricaError> {
        let description = description.into();
        BoricaError::check_length("description", &description, 1, DESCRIPTION_WIDTH)?;
        self.description = Some(description);
        Ok(self)
    }

    /// Sets the currency; the code is upper-cased. Defaults to `EUR`.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] if the code is not three letters.
    pub fn currency(mut self, currency: &str) -> Result<Self, BoricaError> {
        self.currency = currency.parse()?;
        Ok(self)
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::MissingField`] if the amount, order ID or
    /// description was never set.
    pub fn build(self) -> Result<TransactionRequest, BoricaError> {
        Ok(TransactionRequest {
            amount: self.amount.ok_or(BoricaError::MissingField("amount"))?,
            order_id: self.order_id.ok_or(BoricaError::MissingField("order_id"))?,
            description: self
                .description
                .ok_or(BoricaError::MissingField("description"))?,
            currency: self.currency,
        })
    }
}

/// A gateway operation: what the message asks the gateway to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Register a new payment. In protocol `2.0` the message also carries a
    /// one-time ticket (blank when `None`).
    Register {
        /// Up to six characters, space-padded on the wire.
        one_time_ticket: Option<String>,
    },
    /// Ask for the status of a registered payment.
    Status,
    /// Register a delayed authorization.
    RegisterDelayed,
    /// Complete a delayed authorization.
    CompleteDelayed,
    /// Reverse a delayed authorization.
    ReverseDelayed,
    /// Reverse a payment.
    Reverse,
}

impl Operation {
    /// Returns the leading transaction code.
    ///
    /// Status checks reuse the registration code; the endpoint tells the two
    /// apart.
    #[must_use]
    pub const fn transaction_code(&self) -> TransactionCode {
        match self {
            Self::Register { .. } | Self::Status => TransactionCode::Register,
            Self::RegisterDelayed => TransactionCode::DelayedAuthorizationRequest,
            Self::CompleteDelayed => TransactionCode::DelayedAuthorizationComplete,
            Self::ReverseDelayed => TransactionCode::DelayedAuthorizationReversal,
            Self::Reverse => TransactionCode::Reversal,
        }
    }

    /// Returns the endpoint the operation is sent to.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::Register { .. } => Endpoint::RegisterTransaction,
            Self::Status => Endpoint::TransactionStatusReport,
            Self::RegisterDelayed
            | Self::CompleteDelayed
            | Self::ReverseDelayed
            | Self::Reverse => Endpoint::ManageTransaction,
        }
    }
}

/// Lays out request fields in the fixed-width eBorica format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBuilder {
    terminal_id: TerminalId,
    language: Language,
}

impl MessageBuilder {
    /// Creates a builder bound to one merchant terminal.
    #[must_use]
    pub const fn new(terminal_id: TerminalId, language: Language) -> Self {
        Self {
            terminal_id,
            language,
        }
    }

    /// Returns the terminal ID.
    #[must_use]
    pub const fn terminal_id(&self) -> &TerminalId {
        &self.terminal_id
    }

    /// Returns the display language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Builds the unsigned base message.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::LengthViolation`] if a registration ticket is
    /// longer than six bytes.
    pub fn build(
        &self,
        operation: &Operation,
        request: &TransactionRequest,
        version: ProtocolVersion,
        timestamp: GatewayTimestamp,
    ) -> Result<Vec<u8>, BoricaError> {
        let mut message = String::with_capacity(200);
        message.push_str(operation.transaction_code().as_str());
        message.push_str(&timestamp.to_string());
        message.push_str(&request.formatted_amount());
        message.push_str(self.terminal_id.as_str());
        message.push_str(&request.formatted_order_id());
        message.push_str(&request.formatted_description());
        message.push_str(self.language.as_str());
        message.push_str(version.as_str());

        if version.has_currency() {
            message.push_str(request.currency().as_str());
        }

        if let Operation::Register { one_time_ticket } = operation {
            if version.has_one_time_ticket() {
                let ticket = one_time_ticket.as_deref().unwrap_or_default();
                BoricaError::check_length("one_time_ticket", ticket, 0, ONE_TIME_TICKET_WIDTH)?;
                message.push_str(&pad_right(ticket, ONE_TIME_TICKET_WIDTH));
            }
        }

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            code = %operation.transaction_code(),
            version = %version,
            len = message.len(),
            "composed eBorica message"
        );

        Ok(message.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::BoricaErrorKind;

    fn request() -> TransactionRequest {
        TransactionRequest::builder()
            .amount("1")
            .and_then(|b| b.order_id("1"))
            .and_then(|b| b.description("testing the process"))
            .and_then(|b| b.currency("EUR"))
            .and_then(TransactionRequestBuilder::build)
            .unwrap()
    }

    fn builder() -> MessageBuilder {
        MessageBuilder::new("12345678".parse().unwrap(), Language::En)
    }

    fn timestamp() -> GatewayTimestamp {
        "20261018120000".parse().unwrap()
    }

    fn prefix(code: &str, version: &str) -> String {
        format!(
            "{code}20261018120000000000000100123456781{:14}{:<125}EN{version}",
            "", "testing the process",
        )
    }

    #[test]
    fn test_formatted_fields() {
        let request = request();
        assert_eq!(request.formatted_amount(), "000000000100");
        assert_eq!(request.formatted_order_id(), format!("{:<15}", "1"));
        assert_eq!(
            request.formatted_description(),
            format!("{:<125}", "testing the process")
        );
        assert_eq!(request.currency().as_str(), "EUR");
    }

    #[test]
    fn test_amount_validation() {
        let err = TransactionRequest::builder()
            .amount("not-a-number-amount")
            .unwrap_err();
        assert_eq!(err.kind(), BoricaErrorKind::InvalidParameter);
    }

    #[test]
    fn test_order_id_bounds() {
        assert!(TransactionRequest::builder().order_id("123456789012345").is_ok());
        for bad in ["", "12345678910111213"] {
            let err = TransactionRequest::builder().order_id(bad).unwrap_err();
            assert_eq!(err.kind(), BoricaErrorKind::LengthViolation);
        }
    }

    #[test]
    fn test_description_bounds() {
        assert!(TransactionRequest::builder().description("x".repeat(125)).is_ok());
        for bad in [String::new(), "x".repeat(126)] {
            let err = TransactionRequest::builder().description(bad).unwrap_err();
            assert_eq!(err.kind(), BoricaErrorKind::LengthViolation);
        }
    }

    #[test]
    fn test_build_requires_fields() {
        let err = TransactionRequest::builder()
            .amount("1")
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, BoricaError::MissingField("order_id")));
    }

    #[test]
    fn test_currency_defaults_to_eur() {
        let request = TransactionRequest::builder()
            .amount("1")
            .and_then(|b| b.order_id("1"))
            .and_then(|b| b.description("d"))
            .and_then(TransactionRequestBuilder::build)
            .unwrap();
        assert_eq!(request.currency(), Currency::EUR);
    }

    #[test]
    fn test_register_1_0_omits_currency() {
        let message = builder()
            .build(
                &Operation::Register {
                    one_time_ticket: Some("ABC".into()),
                },
                &request(),
                ProtocolVersion::V1_0,
                timestamp(),
            )
            .unwrap();
        assert_eq!(String::from_utf8(message).unwrap(), prefix("10", "1.0"));
    }

    #[test]
    fn test_register_1_1_appends_currency() {
        let message = builder()
            .build(
                &Operation::Register {
                    one_time_ticket: None,
                },
                &request(),
                ProtocolVersion::V1_1,
                timestamp(),
            )
            .unwrap();
        assert_eq!(
            String::from_utf8(message).unwrap(),
            format!("{}EUR", prefix("10", "1.1"))
        );
    }

    #[test]
    fn test_register_2_0_appends_padded_ticket() {
        let message = builder()
            .build(
                &Operation::Register {
                    one_time_ticket: None,
                },
                &request(),
                ProtocolVersion::V2_0,
                timestamp(),
            )
            .unwrap();
        assert_eq!(
            String::from_utf8(message).unwrap(),
            format!("{}EUR      ", prefix("10", "2.0"))
        );

        let message = builder()
            .build(
                &Operation::Register {
                    one_time_ticket: Some("T1".into()),
                },
                &request(),
                ProtocolVersion::V2_0,
                timestamp(),
            )
            .unwrap();
        assert!(message.ends_with(b"EURT1    "));
    }

    #[test]
    fn test_ticket_longer_than_field() {
        let err = builder()
            .build(
                &Operation::Register {
                    one_time_ticket: Some("1234567".into()),
                },
                &request(),
                ProtocolVersion::V2_0,
                timestamp(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), BoricaErrorKind::LengthViolation);
    }

    #[test]
    fn test_status_2_0_has_no_ticket() {
        let message = builder()
            .build(&Operation::Status, &request(), ProtocolVersion::V2_0, timestamp())
            .unwrap();
        assert_eq!(
            String::from_utf8(message).unwrap(),
            format!("{}EUR", prefix("10", "2.0"))
        );
    }

    #[test]
    fn test_unknown_version_behaves_as_1_1() {
        let coerced = builder()
            .build(&Operation::Reverse, &request(), "7.7".into(), timestamp())
            .unwrap();
        let explicit = builder()
            .build(&Operation::Reverse, &request(), ProtocolVersion::V1_1, timestamp())
            .unwrap();
        assert_eq!(coerced, explicit);
        assert!(coerced.starts_with(b"40"));
    }

    #[test]
    fn test_operation_codes_and_endpoints() {
        let cases = [
            (Operation::Status, "10", Endpoint::TransactionStatusReport),
            (Operation::RegisterDelayed, "21", Endpoint::ManageTransaction),
            (Operation::CompleteDelayed, "22", Endpoint::ManageTransaction),
            (Operation::ReverseDelayed, "23", Endpoint::ManageTransaction),
            (Operation::Reverse, "40", Endpoint::ManageTransaction),
        ];
        for (operation, code, endpoint) in cases {
            assert_eq!(operation.transaction_code().as_str(), code);
            assert_eq!(operation.endpoint(), endpoint);
        }
    }

    #[test]
    fn test_message_length_by_version() {
        let request = request();
        let len = |version| {
            builder()
                .build(&Operation::Reverse, &request, version, timestamp())
                .unwrap()
                .len()
        };
        assert_eq!(len(ProtocolVersion::V1_0), 181);
        assert_eq!(len(ProtocolVersion::V1_1), 184);
    }

    proptest! {
        #[test]
        fn test_order_id_padded_to_fifteen(order_id in "[ -~]{1,15}") {
            let request = TransactionRequest::builder()
                .amount("1")
                .and_then(|b| b.order_id(order_id.as_str()))
                .and_then(|b| b.description("d"))
                .and_then(TransactionRequestBuilder::build)
                .unwrap();
            let expected = format!("{order_id:<15}");
            let field = request.formatted_order_id();
            prop_assert_eq!(field.len(), 15);
            prop_assert_eq!(&field, &expected);

            let message = builder()
                .build(&Operation::Reverse, &request, ProtocolVersion::V1_1, timestamp())
                .unwrap();
            prop_assert_eq!(&message[36..51], expected.as_bytes());
        }

        #[test]
        fn test_description_padded_to_125(description in "[ -~]{1,125}") {
            let request = TransactionRequest::builder()
                .amount("1")
                .and_then(|b| b.order_id("1"))
                .and_then(|b| b.description(description.as_str()))
                .and_then(TransactionRequestBuilder::build)
                .unwrap();
            let expected = format!("{description:<125}");
            let field = request.formatted_description();
            prop_assert_eq!(field.len(), 125);
            prop_assert_eq!(&field, &expected);

            let message = builder()
                .build(&Operation::Reverse, &request, ProtocolVersion::V1_1, timestamp())
                .unwrap();
            prop_assert_eq!(message.len(), 184);
            prop_assert_eq!(&message[51..176], expected.as_bytes());
        }

        #[test]
        fn test_overlong_order_id_rejected(order_id in "[ -~]{16,40}") {
            let err = TransactionRequest::builder().order_id(order_id).unwrap_err();
            prop_assert_eq!(err.kind(), BoricaErrorKind::LengthViolation);
        }
    }
}
