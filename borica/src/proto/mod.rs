//! Wire layout of eBorica messages.
//!
//! A request is a concatenation of fixed-width ASCII fields. The first two
//! bytes are a [`TransactionCode`]; the layout that follows depends on the
//! [`ProtocolVersion`]:
//!
//! | field            | width | notes                                    |
//! |------------------|-------|------------------------------------------|
//! | transaction code | 2     |                                          |
//! | timestamp        | 14    | `YYYYMMDDHHmmss`                         |
//! | amount           | 12    | minor units, zero-padded                 |
//! | terminal ID      | 8     |                                          |
//! | order ID         | 15    | space-padded                             |
//! | description      | 125   | space-padded                             |
//! | language         | 2     | `BG` or `EN`                             |
//! | protocol version | 3     |                                          |
//! | currency         | 3     | absent in `1.0`                          |
//! | one-time ticket  | 6     | registration in `2.0` only, space-padded |
//!
//! Responses use a shorter layout described in [`response_layout`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BoricaError;

pub mod encoding;
pub mod version;

pub use encoding::{EBORICA_PARAM, decode_message, encode_message, percent_encode};
pub use version::ProtocolVersion;

/// Width of the terminal ID field.
pub const TERMINAL_ID_WIDTH: usize = 8;
/// Width of the order ID field.
pub const ORDER_ID_WIDTH: usize = 15;
/// Width of the description field.
pub const DESCRIPTION_WIDTH: usize = 125;
/// Width of the language field.
pub const LANGUAGE_WIDTH: usize = 2;
/// Width of the currency field.
pub const CURRENCY_WIDTH: usize = 3;
/// Width of the one-time ticket field.
pub const ONE_TIME_TICKET_WIDTH: usize = 6;

/// `(offset, length)` of each field in a decoded gateway response.
pub mod response_layout {
    /// Transaction code.
    pub const TRANSACTION_CODE: (usize, usize) = (0, 2);
    /// Transaction time, `YYYYMMDDHHmmss`.
    pub const TRANSACTION_TIME: (usize, usize) = (2, 14);
    /// Amount in minor units.
    pub const AMOUNT: (usize, usize) = (16, 12);
    /// Terminal ID.
    pub const TERMINAL_ID: (usize, usize) = (28, 8);
    /// Order ID, space-padded.
    pub const ORDER_ID: (usize, usize) = (36, 15);
    /// Response code, `00` on success.
    pub const RESPONSE_CODE: (usize, usize) = (51, 2);
    /// Protocol version literal.
    pub const PROTOCOL_VERSION: (usize, usize) = (53, 3);
    /// Signature.
    pub const SIGN: (usize, usize) = (56, crate::crypto::SIGNATURE_LEN);

    /// Length of the signed header that precedes the signature.
    pub const HEADER_LEN: usize = SIGN.0;
    /// Minimum decoded length of a well-formed response.
    pub const MIN_LEN: usize = SIGN.0 + SIGN.1;
}

/// Two-digit operation code leading every request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransactionCode {
    /// `10`: register a payment (also used for status checks).
    Register,
    /// `11`: pay profit.
    PayProfit,
    /// `21`: delayed authorization request.
    DelayedAuthorizationRequest,
    /// `22`: delayed authorization completion.
    DelayedAuthorizationComplete,
    /// `23`: delayed authorization reversal.
    DelayedAuthorizationReversal,
    /// `40`: reversal.
    Reversal,
    /// `41`: payed-profit reversal.
    PayedProfitReversal,
}

impl TransactionCode {
    /// Every known code.
    pub const ALL: [Self; 7] = [
        Self::Register,
        Self::PayProfit,
        Self::DelayedAuthorizationRequest,
        Self::DelayedAuthorizationComplete,
        Self::DelayedAuthorizationReversal,
        Self::Reversal,
        Self::PayedProfitReversal,
    ];

    /// Returns the two-digit wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "10",
            Self::PayProfit => "11",
            Self::DelayedAuthorizationRequest => "21",
            Self::DelayedAuthorizationComplete => "22",
            Self::DelayedAuthorizationReversal => "23",
            Self::Reversal => "40",
            Self::PayedProfitReversal => "41",
        }
    }
}

impl FromStr for TransactionCode {
    type Err = BoricaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| BoricaError::invalid("transaction_code", format!("unknown code `{s}`")))
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language of the gateway's payment page.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// Bulgarian.
    Bg,
    /// English. Any unrecognized language maps here.
    #[default]
    En,
}

impl Language {
    /// Returns the two-letter wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bg => "BG",
            Self::En => "EN",
        }
    }
}

impl From<&str> for Language {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "BG" => Self::Bg,
            "EN" => Self::En,
            _ => {
                #[cfg(feature = "telemetry")]
                tracing::debug!(language = value, "unsupported language, using EN");
                Self::En
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Three-letter ISO 4217 currency code, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; CURRENCY_WIDTH]);

impl Currency {
    /// Euro, the default currency.
    pub const EUR: Self = Self(*b"EUR");
    /// Bulgarian lev.
    pub const BGN: Self = Self(*b"BGN");

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("EUR")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::EUR
    }
}

impl FromStr for Currency {
    type Err = BoricaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bytes: [u8; CURRENCY_WIDTH] = upper
            .as_bytes()
            .try_into()
            .map_err(|_| BoricaError::invalid("currency", format!("`{s}` is not 3 letters")))?;
        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(BoricaError::invalid(
                "currency",
                format!("`{s}` must contain letters only"),
            ));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Merchant terminal identifier assigned by the gateway: exactly eight digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerminalId(String);

impl TerminalId {
    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TerminalId {
    type Err = BoricaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != TERMINAL_ID_WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BoricaError::invalid(
                "terminal_id",
                format!("`{s}` is not {TERMINAL_ID_WIDTH} digits"),
            ));
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TerminalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TerminalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Left-justifies `value` and pads it with spaces to `width` bytes.
///
/// Longer values are returned unchanged; callers validate lengths first.
pub(crate) fn pad_right(value: &str, width: usize) -> String {
    let mut padded = String::with_capacity(width.max(value.len()));
    padded.push_str(value);
    padded.extend(std::iter::repeat_n(' ', width.saturating_sub(value.len())));
    padded
}
