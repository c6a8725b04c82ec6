//! Webhook apply handler - verified events into the account lifecycle.
//!
//! Verification failures stop here and never reach the lifecycle. Of the
//! provider's event types only `account.updated` drives state; everything
//! else is acknowledged untouched so the provider stops redelivering it.

use std::sync::Arc;

use crate::domain::account::{ProviderEventKind, WebhookError, WebhookVerifier};

use super::lifecycle::{AccountLifecycle, SnapshotOutcome};

/// Outcome of a verified webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The owning record was updated.
    Applied,
    /// Verified event for a provider account this service never
    /// registered; acknowledged without action.
    UnknownAccount,
    /// Event type this service does not react to.
    Ignored,
}

/// Verifies inbound webhook deliveries and applies account updates.
pub struct ApplyWebhookHandler {
    verifier: WebhookVerifier,
    lifecycle: Arc<AccountLifecycle>,
}

impl ApplyWebhookHandler {
    pub fn new(verifier: WebhookVerifier, lifecycle: Arc<AccountLifecycle>) -> Self {
        Self {
            verifier,
            lifecycle,
        }
    }

    /// Processes one raw webhook delivery.
    ///
    /// `payload` must be the exact request bytes: the signature covers
    /// them byte for byte.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = match self.verifier.verify_and_parse(payload, signature_header) {
            Ok(event) => event,
            Err(err) => {
                match &err {
                    WebhookError::BadSignature => {
                        tracing::warn!("webhook signature mismatch, possible forgery attempt");
                    }
                    WebhookError::Stale => {
                        tracing::warn!("webhook timestamp outside tolerance, possible replay");
                    }
                    WebhookError::MalformedPayload(detail) => {
                        // A provider-signed payload should always parse.
                        tracing::error!(detail = %detail, "unparsable payload under a valid signature");
                    }
                    _ => {
                        tracing::warn!(error = %err, "rejected webhook delivery");
                    }
                }
                return Err(err);
            }
        };

        match event.kind() {
            ProviderEventKind::AccountUpdated => {
                let snapshot = event.account_snapshot().map_err(|err| {
                    tracing::error!(
                        event_id = %event.id,
                        "account.updated event without a valid account object"
                    );
                    err
                })?;

                match self.lifecycle.apply_provider_snapshot(snapshot).await {
                    Ok(SnapshotOutcome::Applied) => Ok(WebhookOutcome::Applied),
                    Ok(SnapshotOutcome::UnknownAccount) => Ok(WebhookOutcome::UnknownAccount),
                    Err(err) => Err(WebhookError::Storage(err.to_string())),
                }
            }
            ProviderEventKind::Unknown => {
                tracing::debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "acknowledging unhandled event type"
                );
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}
