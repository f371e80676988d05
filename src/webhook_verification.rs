//! # Webhook Signature Verification
//!
//! HMAC-SHA256 over the exact raw request bytes, base64-encoded, compared in
//! constant time to prevent timing attacks.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
pub const SHOP_DOMAIN_HEADER: &str = "x-shop-domain";

/// Errors that can occur during webhook signature verification
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Missing required signature header: {header}")]
    MissingSignature { header: String },

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("No webhook secret configured")]
    NoSecret,
}

/// Result type for webhook verification
pub type VerificationResult<T> = Result<T, VerificationError>;

/// Verifies a webhook signature: base64(HMAC-SHA256(secret, body)).
///
/// The body must be the raw request bytes as received. Re-serialized JSON
/// does not round-trip byte-for-byte, so verification happens before any
/// decoding.
pub fn verify_signature(body: &[u8], signature_header: &str, secret: &str) -> VerificationResult<()> {
    if signature_header.is_empty() {
        return Err(VerificationError::MissingSignature {
            header: "X-Webhook-Signature".to_string(),
        });
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| VerificationError::VerificationFailed)?;
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    // Compare signatures using constant-time comparison to prevent timing attacks
    if subtle::ConstantTimeEq::ct_eq(expected.as_bytes(), signature_header.as_bytes()).into() {
        Ok(())
    } else {
        Err(VerificationError::VerificationFailed)
    }
}

/// Computes the expected signature for a body. Used by tests and tooling.
pub fn compute_signature(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_verification_success() {
        let secret = "test_secret";
        let body = br#"{"id": 1}"#;
        let signature = compute_signature(body, secret);

        assert!(verify_signature(body, &signature, secret).is_ok());
    }

    #[test]
    fn test_signature_verification_wrong_secret() {
        let body = br#"{"id": 1}"#;
        let signature = compute_signature(body, "other_secret");

        assert!(matches!(
            verify_signature(body, &signature, "test_secret"),
            Err(VerificationError::VerificationFailed)
        ));
    }

    #[test]
    fn test_signature_verification_tampered_body() {
        let secret = "test_secret";
        let signature = compute_signature(br#"{"id": 1}"#, secret);

        assert!(verify_signature(br#"{"id": 2}"#, &signature, secret).is_err());
    }

    #[test]
    fn test_signature_verification_missing_header() {
        assert!(matches!(
            verify_signature(b"{}", "", "secret"),
            Err(VerificationError::MissingSignature { .. })
        ));
    }

    #[test]
    fn test_signature_sensitive_to_whitespace() {
        let secret = "test_secret";
        let signature = compute_signature(br#"{"id":1}"#, secret);

        // Same JSON, different bytes.
        assert!(verify_signature(br#"{ "id": 1 }"#, &signature, secret).is_err());
    }
}
