// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook delivery signature verification.
//!
//! The identity provider signs every delivery with HMAC-SHA256 over
//! `{delivery_id}.{timestamp}.{body}`. The signature header carries a
//! space-separated list of `v1,<base64>` candidates (older entries stay
//! valid while a secret is being rotated), and the timestamp header
//! bounds the replay window.

use crate::error::AppError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Maximum clock skew between the provider and us, in either direction.
const TOLERANCE_SECS: i64 = 5 * 60;

/// Verifies webhook delivery signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    /// Create a verifier from the configured signing secret
    /// (`whsec_` + base64-encoded key).
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = BASE64.decode(encoded).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Invalid webhook signing secret: {}", e))
        })?;
        Ok(Self { key })
    }

    /// Verify a delivery against its `delivery-id`, `delivery-timestamp`
    /// and `delivery-signature` header values.
    pub fn verify(
        &self,
        delivery_id: &str,
        timestamp: &str,
        signature_header: &str,
        body: &[u8],
    ) -> Result<(), AppError> {
        self.verify_at(
            delivery_id,
            timestamp,
            signature_header,
            body,
            chrono::Utc::now().timestamp(),
        )
    }

    /// Verification with an injectable clock.
    fn verify_at(
        &self,
        delivery_id: &str,
        timestamp: &str,
        signature_header: &str,
        body: &[u8],
        now: i64,
    ) -> Result<(), AppError> {
        let ts: i64 = timestamp.parse().map_err(|_| {
            AppError::SignatureInvalid(format!("malformed timestamp: {}", timestamp))
        })?;

        if (now - ts).abs() > TOLERANCE_SECS {
            return Err(AppError::SignatureInvalid(format!(
                "timestamp outside tolerance (delta {}s)",
                now - ts
            )));
        }

        let expected = self.compute_signature(delivery_id, timestamp, body)?;

        // Header format: "v1,<sig> v1,<sig> ..." - any matching v1
        // candidate accepts the delivery.
        for candidate in signature_header.split_whitespace() {
            let Some((version, encoded)) = candidate.split_once(',') else {
                continue;
            };
            if version != "v1" {
                continue;
            }
            let Ok(candidate_bytes) = BASE64.decode(encoded) else {
                continue;
            };
            if expected.ct_eq(&candidate_bytes).into() {
                return Ok(());
            }
        }

        Err(AppError::SignatureInvalid(
            "no matching signature".to_string(),
        ))
    }

    /// HMAC-SHA256 over `{id}.{timestamp}.{body}`.
    fn compute_signature(
        &self,
        delivery_id: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
        mac.update(delivery_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_dGVzdC13ZWJob29rLXNpZ25pbmcta2V5";

    fn sign(verifier: &WebhookVerifier, id: &str, ts: &str, body: &[u8]) -> String {
        let sig = verifier.compute_signature(id, ts, body).unwrap();
        format!("v1,{}", BASE64.encode(sig))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = br#"{"type":"user.created","data":{"id":"ext_1"}}"#;
        let header = sign(&verifier, "msg_1", "1700000000", body);

        let result = verifier.verify_at("msg_1", "1700000000", &header, body, 1_700_000_000);
        assert!(result.is_ok());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let other = WebhookVerifier::new("whsec_b3RoZXIta2V5LW90aGVyLWtleQ==").unwrap();
        let body = b"{}";
        let header = sign(&other, "msg_1", "1700000000", body);

        let result = verifier.verify_at("msg_1", "1700000000", &header, body, 1_700_000_000);
        assert!(matches!(result, Err(AppError::SignatureInvalid(_))));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let header = sign(&verifier, "msg_1", "1700000000", b"original");

        let result = verifier.verify_at("msg_1", "1700000000", &header, b"tampered", 1_700_000_000);
        assert!(matches!(result, Err(AppError::SignatureInvalid(_))));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = b"{}";
        let header = sign(&verifier, "msg_1", "1700000000", body);

        // 301 seconds after signing
        let result = verifier.verify_at("msg_1", "1700000000", &header, body, 1_700_000_301);
        assert!(matches!(result, Err(AppError::SignatureInvalid(_))));

        // Exactly at the tolerance boundary is still fine
        let result = verifier.verify_at("msg_1", "1700000000", &header, body, 1_700_000_300);
        assert!(result.is_ok());
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = b"{}";
        let header = sign(&verifier, "msg_1", "1700000400", body);

        let result = verifier.verify_at("msg_1", "1700000400", &header, body, 1_700_000_000);
        assert!(matches!(result, Err(AppError::SignatureInvalid(_))));
    }

    #[test]
    fn test_malformed_timestamp_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let result = verifier.verify_at("msg_1", "not-a-number", "v1,AAAA", b"{}", 1_700_000_000);
        assert!(matches!(result, Err(AppError::SignatureInvalid(_))));
    }

    #[test]
    fn test_any_matching_candidate_accepts() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = b"{}";
        let valid = sign(&verifier, "msg_1", "1700000000", body);
        // Garbage, an unknown version, then the valid entry
        let header = format!("v1,AAAA v2,{} {}", BASE64.encode(b"nope"), valid);

        let result = verifier.verify_at("msg_1", "1700000000", &header, body, 1_700_000_000);
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_v1_scheme_alone_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = b"{}";
        let sig = verifier
            .compute_signature("msg_1", "1700000000", body)
            .unwrap();
        let header = format!("v2,{}", BASE64.encode(sig));

        let result = verifier.verify_at("msg_1", "1700000000", &header, body, 1_700_000_000);
        assert!(matches!(result, Err(AppError::SignatureInvalid(_))));
    }

    #[test]
    fn test_secret_prefix_optional() {
        let with_prefix = WebhookVerifier::new(SECRET).unwrap();
        let without_prefix = WebhookVerifier::new("dGVzdC13ZWJob29rLXNpZ25pbmcta2V5").unwrap();
        let body = b"{}";
        let header = sign(&with_prefix, "msg_1", "1700000000", body);

        let result = without_prefix.verify_at("msg_1", "1700000000", &header, body, 1_700_000_000);
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_secret_encoding() {
        assert!(WebhookVerifier::new("whsec_!!!not-base64!!!").is_err());
    }
}
