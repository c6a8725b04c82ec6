//! Stripe wire types.
//!
//! Only the fields this service reads are captured; the rest of Stripe's
//! response schema is ignored by serde.

use serde::Deserialize;

use crate::ports::{OnboardingLink, ProviderAccount};

/// Connected account object from the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeAccount {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub country: String,
    pub default_currency: String,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
    #[serde(default)]
    pub details_submitted: bool,
}

impl From<StripeAccount> for ProviderAccount {
    fn from(account: StripeAccount) -> Self {
        ProviderAccount {
            id: account.id,
            email: account.email,
            country: account.country,
            default_currency: account.default_currency,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
            details_submitted: account.details_submitted,
        }
    }
}

/// Account link object from `POST /v1/account_links`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeAccountLink {
    pub url: String,
    pub expires_at: i64,
}

impl From<StripeAccountLink> for OnboardingLink {
    fn from(link: StripeAccountLink) -> Self {
        OnboardingLink {
            url: link.url,
            expires_at: link.expires_at,
        }
    }
}

/// Error envelope returned by the Stripe API on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

/// Error body inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
}
