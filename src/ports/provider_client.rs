//! Provider client port for the external payment API.
//!
//! A thin capability surface over the provider: create an account, mint an
//! onboarding link, and fetch the current account state. Keeping it a trait
//! lets tests substitute a fake and keeps the rest of the service ignorant
//! of the provider's wire protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::account::ProviderSnapshot;
use crate::domain::foundation::UserId;

/// Port for the external payment provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Create a new account with the provider.
    ///
    /// Not idempotent: every call creates a fresh provider account. The
    /// provider offers no natural idempotency key for account creation
    /// from this side.
    async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<ProviderAccount, ProviderError>;

    /// Create a provider-hosted onboarding link for an account.
    ///
    /// The returned URL is time-limited and single-use.
    async fn create_onboarding_link(
        &self,
        account_id: &str,
        return_url: &str,
        refresh_url: &str,
    ) -> Result<OnboardingLink, ProviderError>;

    /// Fetch the current authoritative state of an account.
    async fn retrieve_account(&self, account_id: &str) -> Result<ProviderAccount, ProviderError>;
}

/// Request to create a provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// Internal user ID, attached as provider metadata.
    pub user_id: UserId,

    /// Two-letter country code for the account.
    pub country: String,

    /// Account holder email, when known.
    pub email: Option<String>,
}

/// Provider account state as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccount {
    /// Provider's account ID (acct_xxx format).
    pub id: String,

    /// Account holder email.
    pub email: Option<String>,

    /// Two-letter country code.
    pub country: String,

    /// Settlement currency.
    pub default_currency: String,

    /// Whether the account can accept charges.
    pub charges_enabled: bool,

    /// Whether the account can receive payouts.
    pub payouts_enabled: bool,

    /// Whether the holder has submitted the required onboarding details.
    pub details_submitted: bool,
}

impl ProviderAccount {
    /// The complete snapshot carried by this account state.
    pub fn snapshot(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            provider_account_id: self.id.clone(),
            charges_enabled: self.charges_enabled,
            payouts_enabled: self.payouts_enabled,
            details_submitted: self.details_submitted,
            email: self.email.clone(),
            country: self.country.clone(),
            default_currency: self.default_currency.clone(),
        }
    }
}

/// Provider-hosted onboarding link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingLink {
    /// URL the user completes onboarding at.
    pub url: String,

    /// When the link expires (Unix timestamp).
    pub expires_at: i64,
}

/// Errors from provider operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Missing or invalid credentials. Fatal; never retried.
    #[error("provider configuration error: {0}")]
    Config(String),

    /// The provider rejected the request. Caller-fixable; not retried
    /// automatically.
    #[error("provider rejected the request: {message}")]
    Client {
        message: String,
        provider_code: Option<String>,
    },

    /// Network failure, timeout, rate limit, or provider outage. Safe to
    /// retry with backoff.
    #[error("provider unavailable: {0}")]
    Transient(String),
}

impl ProviderError {
    pub fn config(message: impl Into<String>) -> Self {
        ProviderError::Config(message.into())
    }

    pub fn client(message: impl Into<String>) -> Self {
        ProviderError::Client {
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn client_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        ProviderError::Client {
            message: message.into(),
            provider_code: Some(code.into()),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        ProviderError::Transient(message.into())
    }

    /// True when a retry with backoff may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}
