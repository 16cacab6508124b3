#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Message codec for the Borica eBorica card-payment gateway.
//!
//! A merchant redirects the cardholder to the gateway with a single signed
//! GET parameter, `eBorica`. The parameter carries a fixed-width ASCII message
//! followed by an RSA signature, base64-encoded and then percent-encoded. The
//! gateway answers with a base64 message of the same shape, signed with its
//! own key.
//!
//! # Overview
//!
//! - [`TransactionRequest`] holds validated transaction fields.
//! - [`MessageBuilder`] lays them out for an [`Operation`] and a
//!   [`ProtocolVersion`].
//! - [`Signer`] appends the merchant's SHA-1/RSA signature.
//! - [`UrlEncoder`] produces the final gateway URL.
//! - [`ResponseParser`] decodes a response into a [`GatewayResponse`] and
//!   checks it against the gateway certificate.
//! - [`Borica`] bundles both directions for one merchant.
//!
//! # Modules
//!
//! - [`amount`] - Amounts in minor units
//! - [`client`] - Merchant-bound request side and the [`Borica`] facade
//! - [`config`] - Merchant and certificate configuration
//! - [`crypto`] - Signing and verification
//! - [`gateway`] - Gateway hosts, endpoints and URL assembly
//! - [`key`] - Key material sources and providers
//! - [`proto`] - Wire layout, codes and encoding helpers
//! - [`request`] - Request fields and message composition
//! - [`response`] - Response decoding
//! - [`timestamp`] - The 14-digit gateway timestamp
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod gateway;
pub mod key;
pub mod proto;
pub mod request;
pub mod response;
pub mod timestamp;

pub use amount::Amount;
pub use client::{Borica, GatewayRequest};
pub use config::{CertificateConfig, MerchantConfig};
pub use crypto::{SIGNATURE_LEN, Signer, Verification, Verifier};
pub use error::{BoricaError, BoricaErrorKind, KeyMaterialError};
pub use gateway::{Endpoint, GatewayHosts, GatewayMode, UrlEncoder};
pub use key::{FileKeyProvider, KeyMaterialProvider, KeySource};
pub use proto::{Currency, Language, ProtocolVersion, TerminalId, TransactionCode};
pub use request::{MessageBuilder, Operation, TransactionRequest, TransactionRequestBuilder};
pub use response::{GatewayResponse, ResponseParser};
pub use timestamp::GatewayTimestamp;
