//! Webhook error types with HTTP status mapping.
//!
//! The status codes drive the provider's redelivery policy: verification
//! failures answer 400 and are never retried, while storage failures after
//! a successful verification answer 500 so the provider delivers again.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while verifying or applying a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature did not match the payload (includes length mismatch).
    #[error("invalid signature")]
    BadSignature,

    /// Event timestamp outside the replay tolerance window.
    #[error("timestamp outside tolerance window")]
    Stale,

    /// Signature header absent a field or otherwise unparsable.
    #[error("malformed signature header: {0}")]
    MalformedHeader(String),

    /// Payload failed to parse after the signature verified. Anomalous:
    /// provider-signed payloads are well-formed by construction.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Store failure while applying a verified event.
    #[error("storage error: {0}")]
    Storage(String),
}

impl WebhookError {
    /// True when the provider should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Storage(_))
    }

    /// Maps the error to the HTTP status returned to the provider.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::BadSignature
            | WebhookError::Stale
            | WebhookError::MalformedHeader(_)
            | WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,

            WebhookError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
