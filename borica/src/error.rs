//! Error types for building, signing and parsing eBorica messages.
//!
//! Field validation errors surface at the setter that received the bad value.
//! Cryptographic failures are fatal for the operation that hit them. A response
//! whose signature does not verify is *not* an error: it is reported through
//! [`Verification`](crate::crypto::Verification) on the parsed response.

use serde::{Deserialize, Serialize};

/// Errors produced by the eBorica codec.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BoricaError {
    /// A parameter has the wrong shape (non-numeric amount, bad currency, ...).
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A text field is shorter or longer than the gateway layout allows.
    #[error("`{field}` must be between {min} and {max} bytes, got {actual}")]
    LengthViolation {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum accepted length in bytes.
        min: usize,
        /// Maximum accepted length in bytes.
        max: usize,
        /// Length of the rejected value in bytes.
        actual: usize,
    },

    /// A request was built before a mandatory field was set.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Key or certificate material could not be read or parsed.
    #[error("key material error: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    /// The signing or verification primitive itself failed.
    #[error("signature operation failed: {0}")]
    Signature(String),

    /// Verification ran to completion and rejected the signature.
    #[error("signature does not match the signed payload")]
    SignatureMismatch,

    /// The gateway payload is not valid base64.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded gateway payload does not fit the fixed response layout.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl BoricaError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn check_length(
        field: &'static str,
        value: &str,
        min: usize,
        max: usize,
    ) -> Result<(), Self> {
        let actual = value.len();
        if actual < min || actual > max {
            return Err(Self::LengthViolation {
                field,
                min,
                max,
                actual,
            });
        }
        Ok(())
    }

    /// Returns the machine-readable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> BoricaErrorKind {
        match self {
            Self::InvalidParameter { .. } => BoricaErrorKind::InvalidParameter,
            Self::LengthViolation { .. } => BoricaErrorKind::LengthViolation,
            Self::MissingField(_) => BoricaErrorKind::MissingField,
            Self::KeyMaterial(_) => BoricaErrorKind::KeyMaterial,
            Self::Signature(_) => BoricaErrorKind::Signature,
            Self::SignatureMismatch => BoricaErrorKind::SignatureMismatch,
            Self::Base64(_) | Self::MalformedResponse(_) => BoricaErrorKind::MalformedResponse,
        }
    }
}

/// Failures while loading a private key or a gateway certificate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KeyMaterialError {
    /// The key file could not be read.
    #[error("cannot read `{path}`: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The material is not a PEM document this crate understands.
    #[error("unsupported key format: {0}")]
    UnsupportedFormat(String),

    /// The PEM document was recognized but its contents are invalid.
    #[error("cannot parse {what}: {reason}")]
    Parse {
        /// What was being parsed (`"private key"`, `"certificate"`, ...).
        what: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The private key is encrypted and no password (or a wrong one) was given.
    #[error("private key is encrypted and the password is missing or wrong")]
    Password,

    /// The key does not produce signatures of the width the gateway expects.
    #[error("expected a {expected}-bit RSA key, got {actual} bits")]
    KeySize {
        /// Expected modulus size in bits.
        expected: usize,
        /// Actual modulus size in bits.
        actual: usize,
    },
}

/// Machine-readable error codes for [`BoricaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BoricaErrorKind {
    /// See [`BoricaError::InvalidParameter`].
    InvalidParameter,
    /// See [`BoricaError::LengthViolation`].
    LengthViolation,
    /// See [`BoricaError::MissingField`].
    MissingField,
    /// See [`BoricaError::KeyMaterial`].
    KeyMaterial,
    /// See [`BoricaError::Signature`].
    Signature,
    /// See [`BoricaError::SignatureMismatch`].
    SignatureMismatch,
    /// See [`BoricaError::MalformedResponse`] and [`BoricaError::Base64`].
    MalformedResponse,
}

impl BoricaErrorKind {
    /// Returns the `snake_case` name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::LengthViolation => "length_violation",
            Self::MissingField => "missing_field",
            Self::KeyMaterial => "key_material",
            Self::Signature => "signature",
            Self::SignatureMismatch => "signature_mismatch",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl core::fmt::Display for BoricaErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
