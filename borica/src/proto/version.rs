//! eBorica protocol versions.
//!
//! The version literal travels inside every message and decides which
//! optional fields follow it. Unknown literals are coerced to
//! [`ProtocolVersion::V1_1`] rather than rejected.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of the version field in the wire layout.
pub const VERSION_WIDTH: usize = 3;

/// A supported eBorica protocol version.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// `1.0`: no currency field.
    V1_0,
    /// `1.1`: currency field appended. The default.
    #[default]
    V1_1,
    /// `2.0`: currency field, plus a one-time ticket on registration.
    V2_0,
}

impl ProtocolVersion {
    /// All supported versions.
    pub const SUPPORTED: [Self; 3] = [Self::V1_0, Self::V1_1, Self::V2_0];

    /// Returns the wire literal.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V2_0 => "2.0",
        }
    }

    /// Looks up a literal without coercion.
    #[must_use]
    pub fn from_literal(literal: &str) -> Option<Self> {
        Self::SUPPORTED.into_iter().find(|v| v.as_str() == literal)
    }

    /// Maps any literal to a supported version, falling back to `1.1`.
    #[must_use]
    pub fn coerce(literal: &str) -> Self {
        Self::from_literal(literal.trim()).unwrap_or_else(|| {
            #[cfg(feature = "telemetry")]
            tracing::warn!(literal, "unsupported protocol version, using 1.1");
            Self::default()
        })
    }

    /// Whether messages of this version carry the currency field.
    #[must_use]
    pub const fn has_currency(&self) -> bool {
        !matches!(self, Self::V1_0)
    }

    /// Whether registration messages of this version carry a one-time ticket.
    #[must_use]
    pub const fn has_one_time_ticket(&self) -> bool {
        matches!(self, Self::V2_0)
    }
}

impl From<&str> for ProtocolVersion {
    fn from(literal: &str) -> Self {
        Self::coerce(literal)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProtocolVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::coerce(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_literals() {
        assert_eq!(ProtocolVersion::from("1.0"), ProtocolVersion::V1_0);
        assert_eq!(ProtocolVersion::from("1.1"), ProtocolVersion::V1_1);
        assert_eq!(ProtocolVersion::from("2.0"), ProtocolVersion::V2_0);
    }

    #[test]
    fn test_unknown_literal_coerces_to_1_1() {
        assert_eq!(ProtocolVersion::from("3.0"), ProtocolVersion::V1_1);
        assert_eq!(ProtocolVersion::from(""), ProtocolVersion::V1_1);
        assert_eq!(ProtocolVersion::from_literal("3.0"), None);
    }

    #[test]
    fn test_optional_fields() {
        assert!(!ProtocolVersion::V1_0.has_currency());
        assert!(ProtocolVersion::V1_1.has_currency());
        assert!(!ProtocolVersion::V1_1.has_one_time_ticket());
        assert!(ProtocolVersion::V2_0.has_one_time_ticket());
    }

    #[test]
    fn test_literal_width() {
        for version in ProtocolVersion::SUPPORTED {
            assert_eq!(version.as_str().len(), VERSION_WIDTH);
        }
    }

    #[test]
    fn test_serde() {
        let v: ProtocolVersion = serde_json::from_str("\"2.0\"").unwrap();
        assert_eq!(v, ProtocolVersion::V2_0);
        let v: ProtocolVersion = serde_json::from_str("\"9.9\"").unwrap();
        assert_eq!(v, ProtocolVersion::V1_1);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.1\"");
    }
}
