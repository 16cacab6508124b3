//! Transaction amounts in minor currency units.
//!
//! The gateway carries amounts as a 12-digit, zero-padded count of minor units
//! (`1.50` EUR is `000000000150`). [`Amount`] parses the human-readable decimal
//! form once and keeps the integer value.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BoricaError;

/// Width of the amount field in the wire layout.
pub const AMOUNT_WIDTH: usize = 12;

/// Largest amount representable in [`AMOUNT_WIDTH`] digits.
pub const MAX_MINOR_UNITS: u64 = 999_999_999_999;

/// A non-negative amount stored as minor units (value × 100).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    /// Creates an amount from a raw minor-unit count.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] if the value does not fit in
    /// twelve digits.
    pub fn from_minor_units(minor: u64) -> Result<Self, BoricaError> {
        if minor > MAX_MINOR_UNITS {
            return Err(BoricaError::invalid("amount", "does not fit in 12 digits"));
        }
        Ok(Self(minor))
    }

    /// Converts a decimal major-unit amount (`12.34`) into minor units.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::InvalidParameter`] for negative values, values
    /// with more than two decimal places, or values that overflow the field.
    pub fn from_decimal(value: Decimal) -> Result<Self, BoricaError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(BoricaError::invalid("amount", "must not be negative"));
        }
        let minor = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| BoricaError::invalid("amount", "does not fit in 12 digits"))?;
        if !minor.fract().is_zero() {
            return Err(BoricaError::invalid(
                "amount",
                "must have at most two decimal places",
            ));
        }
        let minor = minor
            .to_u64()
            .filter(|m| *m <= MAX_MINOR_UNITS)
            .ok_or_else(|| BoricaError::invalid("amount", "does not fit in 12 digits"))?;
        Ok(Self(minor))
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.0
    }

    /// Returns the amount in major units (minor units / 100).
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }

    /// Formats the amount as the 12-digit wire field.
    #[must_use]
    pub fn to_field(&self) -> String {
        format!("{:0>width$}", self.0, width = AMOUNT_WIDTH)
    }

    /// Parses the 12-digit wire field back into an amount.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::MalformedResponse`] if the field is not all digits.
    pub fn from_field(field: &str) -> Result<Self, BoricaError> {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BoricaError::MalformedResponse(format!(
                "amount field `{field}` is not numeric"
            )));
        }
        field
            .parse::<u64>()
            .map(Self)
            .map_err(|e| BoricaError::MalformedResponse(e.to_string()))
    }
}

impl FromStr for Amount {
    type Err = BoricaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| BoricaError::invalid("amount", format!("`{s}` is not a number")))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = BoricaError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
