//! `X-Hub-Signature-256` verification: HMAC-SHA256 of the raw body, hex encoded, `sha256=` prefixed.
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is missing")]
    Missing,

    #[error("signature header is malformed")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,

    #[error("webhook secret is not configured")]
    NoSecret,

    #[error("webhook secret is not a valid hmac key")]
    InvalidKey,
}

/// Compute the header value for `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = mac(secret)?;
    mac.update(body);
    Ok(format!("{PREFIX}{}", hex::encode(mac.finalize().into_bytes())))
}

/// Check `header` against `body` in constant time.
pub fn verify(secret: &[u8], header: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::NoSecret);
    }
    let header = header.ok_or(SignatureError::Missing)?;
    let digest = header
        .trim()
        .strip_prefix(PREFIX)
        .and_then(|h| hex::decode(h).ok())
        .ok_or(SignatureError::Malformed)?;

    let mut mac = mac(secret)?;
    mac.update(body);
    mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
}

fn mac(secret: &[u8]) -> Result<HmacSha256, SignatureError> {
    HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)
}
