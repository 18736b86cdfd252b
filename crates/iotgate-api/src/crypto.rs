//! Event signature verification.
//!
//! The provider signs each callback by MACing the event timestamp with the
//! pre-provisioned shared secret and sending the digest base64-encoded in
//! the `signature` field. Verification recomputes the HMAC-SHA256 digest
//! and compares it constant-time against the supplied value, so nothing
//! leaks through timing beyond what the comparison primitive allows.
//!
//! Verification is pure and deterministic. Whether it runs at all is the
//! caller's decision: with no shared secret configured the gateway operates
//! in its explicit unauthenticated mode and skips this check entirely.

use std::fmt;

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature computation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Secret key was rejected by the MAC primitive.
    InvalidSecret,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSecret => write!(f, "invalid secret key"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// Result of signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the signature matched.
    pub is_valid: bool,
    /// Reason for the failure, if any.
    pub error_message: Option<String>,
}

impl ValidationResult {
    /// Creates a successful result.
    pub fn valid() -> Self {
        Self { is_valid: true, error_message: None }
    }

    /// Creates a failed result with a reason.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, error_message: Some(message.into()) }
    }
}

/// Computes the expected signature for a timestamp: base64 of the
/// HMAC-SHA256 digest keyed by the shared secret.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidSecret`] if the secret is rejected by
/// the MAC primitive.
pub fn compute_signature(secret: &str, timestamp: &str) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verifies a supplied signature against the configured shared secret.
///
/// The comparison is byte-for-byte on the base64 text, case- and
/// encoding-exact: a digest that differs only in encoding is a mismatch.
pub fn verify_signature(secret: &str, timestamp: &str, signature: &str) -> ValidationResult {
    if signature.is_empty() {
        return ValidationResult::invalid("signature field is empty");
    }

    let expected = match compute_signature(secret, timestamp) {
        Ok(expected) => expected,
        Err(err) => return ValidationResult::invalid(err.to_string()),
    };

    if timing_safe_eq(signature, &expected) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid("signature mismatch")
    }
}

/// Timing-safe string comparison to prevent timing attacks.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.as_bytes().iter().zip(b.as_bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
