//! Base64 handling for the `eBorica` query parameter.
//!
//! Outbound, the signed message is base64-encoded and the result is then
//! form-urlencoded into the query string (never the other way round). Inbound,
//! the gateway hands back plain base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use url::form_urlencoded;

/// Name of the single query parameter carrying the signed message.
pub const EBORICA_PARAM: &str = "eBorica";

/// Encodes a signed message as standard base64.
#[must_use]
pub fn encode_message(signed: &[u8]) -> String {
    b64.encode(signed)
}

/// Decodes a base64 gateway payload.
///
/// Surrounding whitespace is ignored. A payload that was form-urlencoded
/// in transit (`%2B`, `%2F`, `%3D`) is accepted as well.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64.
pub fn decode_message(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = payload.trim();
    if payload.contains('%') {
        let unescaped: String = form_urlencoded::parse(format!("v={payload}").as_bytes())
            .map(|(_, v)| v.into_owned())
            .collect();
        return b64.decode(unescaped);
    }
    b64.decode(payload)
}

/// Percent-encodes a base64 string for use as the `eBorica` value.
#[must_use]
pub fn percent_encode(base64: &str) -> String {
    form_urlencoded::byte_serialize(base64.as_bytes()).collect()
}
