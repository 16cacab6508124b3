//! Key and certificate material loading.
//!
//! Both sides of the protocol need PEM material: the request side signs with
//! the merchant's private key, the response side verifies with the gateway's
//! certificate. The material is referenced either by a filesystem path or
//! inline, and read through a [`KeyMaterialProvider`] so callers can plug in
//! their own storage.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::KeyMaterialError;

/// Where a private key or certificate lives.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// A path to a PEM file.
    File(PathBuf),
    /// The PEM document itself.
    Inline(String),
}

impl KeySource {
    /// Builds a source from a reference string and a "read from file" flag.
    #[must_use]
    pub fn new(reference: impl Into<String>, from_file: bool) -> Self {
        let reference = reference.into();
        if from_file {
            Self::File(PathBuf::from(reference))
        } else {
            Self::Inline(reference)
        }
    }

    /// Returns `true` if the material must be read from disk.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Inline(pem) => write!(f, "Inline(<{} bytes>)", pem.len()),
        }
    }
}

/// Resolves a [`KeySource`] into raw PEM bytes.
pub trait KeyMaterialProvider: Send + Sync {
    /// Returns the raw bytes referenced by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyMaterialError::Io`] if the material cannot be read.
    fn read(&self, source: &KeySource) -> Result<Vec<u8>, KeyMaterialError>;
}

/// Default provider: inline material is returned as-is, files are read fully.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileKeyProvider;

impl KeyMaterialProvider for FileKeyProvider {
    fn read(&self, source: &KeySource) -> Result<Vec<u8>, KeyMaterialError> {
        match source {
            KeySource::Inline(pem) => Ok(pem.as_bytes().to_vec()),
            KeySource::File(path) => {
                #[cfg(feature = "telemetry")]
                tracing::trace!(path = %path.display(), "reading key material");
                std::fs::read(path).map_err(|source| KeyMaterialError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
}

impl<P: KeyMaterialProvider + ?Sized> KeyMaterialProvider for std::sync::Arc<P> {
    fn read(&self, source: &KeySource) -> Result<Vec<u8>, KeyMaterialError> {
        (**self).read(source)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_new_selects_variant_by_flag() {
        assert!(KeySource::new("keys/merchant.key", true).is_file());
        assert_eq!(
            KeySource::new("-----BEGIN", false),
            KeySource::Inline("-----BEGIN".into())
        );
    }

    #[test]
    fn test_inline_is_returned_verbatim() {
        let bytes = FileKeyProvider
            .read(&KeySource::Inline("pem-body".into()))
            .unwrap();
        assert_eq!(bytes, b"pem-body");
    }

    #[test]
    fn test_reads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"-----BEGIN CERTIFICATE-----").unwrap();
        let source = KeySource::File(file.path().to_path_buf());
        assert_eq!(
            FileKeyProvider.read(&source).unwrap(),
            b"-----BEGIN CERTIFICATE-----"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = KeySource::File(dir.path().join("absent.pem"));
        let err = FileKeyProvider.read(&source).unwrap_err();
        assert!(matches!(err, KeyMaterialError::Io { .. }));
    }

    #[test]
    fn test_debug_hides_inline_material() {
        let debug = format!("{:?}", KeySource::Inline("secret".into()));
        assert_eq!(debug, "Inline(<6 bytes>)");
    }

    #[test]
    fn test_deserializes_externally_tagged() {
        let source: KeySource = serde_json::from_str(r#"{"file":"keys/a.pem"}"#).unwrap();
        assert_eq!(source, KeySource::File(PathBuf::from("keys/a.pem")));
    }
}
