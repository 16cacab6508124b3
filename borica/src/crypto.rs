//! Message signing and signature verification.
//!
//! eBorica uses RSA PKCS#1 v1.5 signatures over SHA-1 with 1024-bit keys, so
//! every signature is exactly [`SIGNATURE_LEN`] bytes. Signatures are detached:
//! they are appended to the message with no delimiter, and the receiver splits
//! them off by length.

use std::fmt;

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use sha1::Sha1;
use x509_cert::Certificate;
use x509_cert::der::{DecodePem, Encode, pem};

use crate::error::{BoricaError, KeyMaterialError};
use crate::key::{KeyMaterialProvider, KeySource};

/// Length in bytes of every gateway signature.
pub const SIGNATURE_LEN: usize = 128;

/// Signs outgoing messages with the merchant's private key.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey<Sha1>,
}

impl Signer {
    /// Parses a PEM private key.
    ///
    /// Accepts unencrypted PKCS#8 (`PRIVATE KEY`), password-protected PKCS#8
    /// (`ENCRYPTED PRIVATE KEY`) and unencrypted PKCS#1 (`RSA PRIVATE KEY`).
    ///
    /// # Errors
    ///
    /// Returns [`KeyMaterialError`] if the key cannot be parsed, the password is
    /// missing or wrong, or the key is not 1024 bits.
    pub fn from_pem(pem: &[u8], password: Option<&str>) -> Result<Self, KeyMaterialError> {
        let (label, document) = pem_document(pem)?;
        let key = match label {
            "PRIVATE KEY" => RsaPrivateKey::from_pkcs8_pem(document)
                .map_err(|e| parse_error("private key", e))?,
            "ENCRYPTED PRIVATE KEY" => {
                let password = password
                    .filter(|p| !p.is_empty())
                    .ok_or(KeyMaterialError::Password)?;
                RsaPrivateKey::from_pkcs8_encrypted_pem(document, password.as_bytes())
                    .map_err(|_| KeyMaterialError::Password)?
            }
            "RSA PRIVATE KEY" if document.contains("Proc-Type:") => {
                return Err(KeyMaterialError::UnsupportedFormat(
                    "legacy encrypted RSA PRIVATE KEY, convert it to PKCS#8".into(),
                ));
            }
            "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_pem(document)
                .map_err(|e| parse_error("private key", e))?,
            other => {
                return Err(KeyMaterialError::UnsupportedFormat(format!(
                    "`{other}` is not a private key"
                )));
            }
        };
        check_modulus(key.size())?;
        Ok(Self {
            key: SigningKey::<Sha1>::new(key),
        })
    }

    /// Reads the key through `provider` and parses it.
    ///
    /// # Errors
    ///
    /// See [`Signer::from_pem`]; also fails if the material cannot be read.
    pub fn load(
        source: &KeySource,
        password: Option<&str>,
        provider: &dyn KeyMaterialProvider,
    ) -> Result<Self, KeyMaterialError> {
        let pem = provider.read(source)?;
        Self::from_pem(&pem, password)
    }

    /// Computes the detached signature of `message`.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::Signature`] if the RSA primitive fails.
    pub fn signature(&self, message: &[u8]) -> Result<Vec<u8>, BoricaError> {
        let signature = self
            .key
            .try_sign(message)
            .map_err(|e| BoricaError::Signature(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// Returns `message` immediately followed by its signature.
    ///
    /// # Errors
    ///
    /// Returns [`BoricaError::Signature`] if the RSA primitive fails.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BoricaError> {
        let signature = self.signature(message)?;
        let mut signed = Vec::with_capacity(message.len() + signature.len());
        signed.extend_from_slice(message);
        signed.extend_from_slice(&signature);
        Ok(signed)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Outcome of checking a response signature.
///
/// `Invalid` means verification ran and rejected the signature; `Error` means
/// verification could not run at all (for example, the certificate is
/// unreadable). Only `Valid` should be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Verification {
    /// The signature matches the payload.
    Valid,
    /// The signature was checked and does not match.
    Invalid,
    /// Verification could not be performed.
    Error(String),
}

impl Verification {
    /// Returns `true` only for [`Verification::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Converts the outcome into a result for callers that want to bail out.
    ///
    /// # Errors
    ///
    /// [`BoricaError::SignatureMismatch`] for `Invalid`,
    /// [`BoricaError::Signature`] for `Error`.
    pub fn into_result(self) -> Result<(), BoricaError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid => Err(BoricaError::SignatureMismatch),
            Self::Error(reason) => Err(BoricaError::Signature(reason)),
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid => f.write_str("invalid"),
            Self::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Verifies gateway signatures against the gateway's public certificate.
#[derive(Clone)]
pub struct Verifier {
    key: VerifyingKey<Sha1>,
}

impl Verifier {
    /// Parses the gateway's public material.
    ///
    /// Accepts an X.509 `CERTIFICATE`, an SPKI `PUBLIC KEY` or a PKCS#1
    /// `RSA PUBLIC KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyMaterialError`] if the material cannot be parsed.
    pub fn from_pem(pem: &[u8]) -> Result<Self, KeyMaterialError> {
        let (label, document) = pem_document(pem)?;
        let key = match label {
            "CERTIFICATE" => {
                let certificate =
                    Certificate::from_pem(document).map_err(|e| parse_error("certificate", e))?;
                let spki = certificate
                    .tbs_certificate
                    .subject_public_key_info
                    .to_der()
                    .map_err(|e| parse_error("certificate", e))?;
                RsaPublicKey::from_public_key_der(&spki)
                    .map_err(|e| parse_error("certificate key", e))?
            }
            "PUBLIC KEY" => RsaPublicKey::from_public_key_pem(document)
                .map_err(|e| parse_error("public key", e))?,
            "RSA PUBLIC KEY" => RsaPublicKey::from_pkcs1_pem(document)
                .map_err(|e| parse_error("public key", e))?,
            other => {
                return Err(KeyMaterialError::UnsupportedFormat(format!(
                    "`{other}` is not a certificate or public key"
                )));
            }
        };
        Ok(Self {
            key: VerifyingKey::<Sha1>::new(key),
        })
    }

    /// Reads the certificate through `provider` and parses it.
    ///
    /// # Errors
    ///
    /// See [`Verifier::from_pem`]; also fails if the material cannot be read.
    pub fn load(
        source: &KeySource,
        provider: &dyn KeyMaterialProvider,
    ) -> Result<Self, KeyMaterialError> {
        let pem = provider.read(source)?;
        Self::from_pem(&pem)
    }

    /// Verifies a signed buffer whose last [`SIGNATURE_LEN`] bytes are the
    /// signature over everything before them.
    #[must_use]
    pub fn verify(&self, signed: &[u8]) -> Verification {
        let Some(split) = signed.len().checked_sub(SIGNATURE_LEN) else {
            return Verification::Error(format!(
                "buffer of {} bytes cannot hold a {SIGNATURE_LEN}-byte signature",
                signed.len()
            ));
        };
        let (payload, signature) = signed.split_at(split);
        self.verify_detached(payload, signature)
    }

    /// Verifies `signature` over `payload`.
    #[must_use]
    pub fn verify_detached(&self, payload: &[u8], signature: &[u8]) -> Verification {
        let Ok(signature) = Signature::try_from(signature) else {
            return Verification::Invalid;
        };
        match self.key.verify(payload, &signature) {
            Ok(()) => Verification::Valid,
            Err(_) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(payload_len = payload.len(), "gateway signature rejected");
                Verification::Invalid
            }
        }
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}

/// Locates the first PEM document in `pem` and returns its label and text.
///
/// Text before the first boundary and after the first post-encapsulation
/// boundary is dropped, so bundles exported with attributes still load.
fn pem_document(pem: &[u8]) -> Result<(&str, &str), KeyMaterialError> {
    const BEGIN: &str = "-----BEGIN ";
    const END: &str = "-----END ";
    let text = std::str::from_utf8(pem)
        .map_err(|_| KeyMaterialError::UnsupportedFormat("material is not PEM text".into()))?;
    let not_pem = || KeyMaterialError::UnsupportedFormat("no PEM boundary found".into());

    let body = &text[text.find(BEGIN).ok_or_else(not_pem)?..];
    let end = body.find(END).ok_or_else(not_pem)? + END.len();
    let close = body[end..].find("-----").ok_or_else(not_pem)? + end + "-----".len();
    let document = &body[..close];

    let label = pem::decode_label(document.as_bytes())
        .map_err(|e| KeyMaterialError::UnsupportedFormat(format!("malformed PEM: {e}")))?;
    Ok((label, document))
}

fn check_modulus(bytes: usize) -> Result<(), KeyMaterialError> {
    if bytes == SIGNATURE_LEN {
        Ok(())
    } else {
        Err(KeyMaterialError::KeySize {
            expected: SIGNATURE_LEN * 8,
            actual: bytes * 8,
        })
    }
}

fn parse_error(what: &'static str, err: impl fmt::Display) -> KeyMaterialError {
    KeyMaterialError::Parse {
        what,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_document_strips_preamble() {
        let pem = b"Bag Attributes\n-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\ntrailer";
        let (label, doc) = pem_document(pem).unwrap();
        assert_eq!(label, "CERTIFICATE");
        assert_eq!(
            doc,
            "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----"
        );
    }

    #[test]
    fn test_pem_document_rejects_non_pem() {
        assert!(matches!(
            pem_document(b"not a key"),
            Err(KeyMaterialError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            pem_document(&[0xff, 0xfe]),
            Err(KeyMaterialError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_pem_document_rejects_mismatched_labels() {
        let pem = b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END PUBLIC KEY-----\n";
        assert!(matches!(
            pem_document(pem),
            Err(KeyMaterialError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_wrong_label_for_signer() {
        let pem = b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            Signer::from_pem(pem, None),
            Err(KeyMaterialError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_modulus_check() {
        assert!(check_modulus(128).is_ok());
        assert!(matches!(
            check_modulus(256),
            Err(KeyMaterialError::KeySize {
                expected: 1024,
                actual: 2048
            })
        ));
    }

    #[test]
    fn test_verification_into_result() {
        assert!(Verification::Valid.into_result().is_ok());
        assert!(matches!(
            Verification::Invalid.into_result(),
            Err(BoricaError::SignatureMismatch)
        ));
        assert!(matches!(
            Verification::Error("x".into()).into_result(),
            Err(BoricaError::Signature(_))
        ));
    }

    #[test]
    fn test_verification_serializes_tagged() {
        let json = serde_json::to_string(&Verification::Error("bad cert".into())).unwrap();
        assert_eq!(json, r#"{"status":"error","reason":"bad cert"}"#);
        let json = serde_json::to_string(&Verification::Valid).unwrap();
        assert_eq!(json, r#"{"status":"valid"}"#);
    }
}
