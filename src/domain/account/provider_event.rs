//! Provider webhook event types.
//!
//! Events are transient: they exist only for one verification and apply
//! cycle and are never persisted. Only the fields this service consumes
//! are captured; the rest of the provider's event schema is ignored.

use serde::{Deserialize, Serialize};

use super::record::ProviderSnapshot;
use super::webhook_errors::WebhookError;

/// Provider webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "account.updated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Container for event-specific data.
    pub data: ProviderEventData,

    /// Whether this is a live mode event.
    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEventData {
    /// The object that triggered the event (shape depends on the type).
    pub object: serde_json::Value,
}

/// Event types this service reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventKind {
    /// The provider account's state changed.
    AccountUpdated,
    /// Any other event type; acknowledged without action.
    Unknown,
}

impl ProviderEventKind {
    pub fn from_type(s: &str) -> Self {
        match s {
            "account.updated" => Self::AccountUpdated,
            _ => Self::Unknown,
        }
    }
}

/// Account object fields carried by an `account.updated` event.
#[derive(Debug, Deserialize)]
struct AccountObject {
    id: String,
    #[serde(default)]
    email: Option<String>,
    country: String,
    default_currency: String,
    #[serde(default)]
    charges_enabled: bool,
    #[serde(default)]
    payouts_enabled: bool,
    #[serde(default)]
    details_submitted: bool,
}

impl ProviderEvent {
    /// Classifies the event type.
    pub fn kind(&self) -> ProviderEventKind {
        ProviderEventKind::from_type(&self.event_type)
    }

    /// Extracts the complete account snapshot from an `account.updated`
    /// event object.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MalformedPayload` when the object does not
    /// carry the account field set.
    pub fn account_snapshot(&self) -> Result<ProviderSnapshot, WebhookError> {
        let account: AccountObject = serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::MalformedPayload(format!("invalid account object: {e}")))?;

        Ok(ProviderSnapshot {
            provider_account_id: account.id,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
            details_submitted: account.details_submitted,
            email: account.email,
            country: account.country,
            default_currency: account.default_currency,
        })
    }
}

/// Builder for test events.
#[cfg(test)]
pub struct ProviderEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for ProviderEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "account.updated".to_string(),
            created: 1704067200,
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl ProviderEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> ProviderEvent {
        ProviderEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: ProviderEventData {
                object: self.object,
            },
            livemode: self.livemode,
        }
    }
}
