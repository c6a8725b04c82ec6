//! Webhook signature verification.
//!
//! Verifies the authenticity and freshness of inbound provider events
//! using HMAC-SHA256 over the exact raw request bytes, with timestamp
//! validation to bound replay exposure.
//!
//! The verifier is stateless and side-effect-free: a failed verification
//! produces an error and nothing else.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::provider_event::ProviderEvent;
use super::webhook_errors::WebhookError;

/// Tolerance for the distance between the event timestamp and now,
/// in either direction (5 minutes). Bounds replay attacks and absorbs
/// clock skew.
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Parsed components of the signature header.
///
/// Format: `t=<unix-seconds>,v1=<hex hmac>`. Unknown fields are ignored
/// for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the signature was generated at.
    pub timestamp: i64,
    /// HMAC-SHA256 signature bytes.
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a signature header string.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MalformedHeader` when a field is missing,
    /// the timestamp is not an integer, or the signature is not hex.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                WebhookError::MalformedHeader("expected key=value fields".to_string())
            })?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::MalformedHeader("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::MalformedHeader("invalid signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| WebhookError::MalformedHeader("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::MalformedHeader("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// Verifier for inbound webhook signatures.
pub struct WebhookVerifier {
    /// Signing secret shared with the provider.
    secret: SecretString,
}

impl WebhookVerifier {
    /// Creates a new verifier with the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verifies a webhook delivery and parses the event.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate the timestamp against the tolerance window
    /// 3. Recompute the signature over `{timestamp}.{payload}`
    /// 4. Compare signatures in constant time
    /// 5. Parse the payload into a `ProviderEvent`
    ///
    /// # Errors
    ///
    /// - `MalformedHeader` - header absent a field or unparsable
    /// - `Stale` - timestamp outside the tolerance window
    /// - `BadSignature` - signature mismatch
    /// - `MalformedPayload` - payload unparsable after a valid signature
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ProviderEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected = self.compute_signature(header.timestamp, payload);
        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::BadSignature);
        }

        let event: ProviderEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        Ok(event)
    }

    /// Rejects timestamps further than the tolerance from now, in either
    /// direction.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        if (now - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
            return Err(WebhookError::Stale);
        }
        Ok(())
    }

    /// Computes HMAC-SHA256 over `{timestamp}.{payload}`.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));

        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key size");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time comparison of two byte slices.
///
/// Prevents timing side-channels that could leak the expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
