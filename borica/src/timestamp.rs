//! Gateway timestamps.
//!
//! Every request carries the merchant's local wall-clock time, and every
//! response echoes the gateway's transaction time, as a 14-digit
//! `YYYYMMDDHHmmss` field without a zone designator.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};

use crate::error::BoricaError;

/// `strftime` pattern of the wire field.
const FORMAT: &str = "%Y%m%d%H%M%S";

/// Width of the timestamp field in the wire layout.
pub const TIMESTAMP_WIDTH: usize = 14;

/// A local date-time as carried by eBorica messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GatewayTimestamp(NaiveDateTime);

impl GatewayTimestamp {
    /// Returns the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Wraps an explicit date-time.
    #[must_use]
    pub const fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// Returns the underlying date-time.
    #[must_use]
    pub const fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl Display for GatewayTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for GatewayTimestamp {
    type Err = BoricaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TIMESTAMP_WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BoricaError::MalformedResponse(format!(
                "timestamp `{s}` is not {TIMESTAMP_WIDTH} digits"
            )));
        }
        NaiveDateTime::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|e| BoricaError::MalformedResponse(format!("timestamp `{s}`: {e}")))
    }
}

impl From<NaiveDateTime> for GatewayTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}
