//! Account lifecycle orchestration.
//!
//! `AccountLifecycle` is the only component allowed to mutate the account
//! store. It owns the three operations that drive the record state machine:
//!
//! - `create_account` - register a fresh provider account and persist the
//!   initial pending record
//! - `apply_provider_snapshot` - the single idempotent mutation primitive
//!   shared by the webhook path and the refresh path
//! - `reconcile` - the read path, optionally refreshing from the provider
//!   and degrading to stored state when the provider is unreachable
//!
//! The state machine tolerates updates in any order because status is
//! recomputed from each complete snapshot rather than transitioned.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::account::{AccountRecord, ProviderSnapshot};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{
    AccountStore, CreateAccountRequest, ProviderClient, ProviderError, StoreError,
};

/// Command to start onboarding for a user.
#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub user_id: UserId,
    pub country: String,
    pub email: Option<String>,
}

/// Result of starting onboarding.
#[derive(Debug, Clone)]
pub struct CreateAccountResult {
    /// Provider-hosted URL the user completes onboarding at.
    pub onboarding_url: String,
    /// The newly created provider account.
    pub provider_account_id: String,
}

/// Outcome of applying a provider snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The owning record was updated.
    Applied,
    /// No record owns this provider account id; nothing was written.
    /// Expected when a webhook races the registration write or belongs
    /// to another environment.
    UnknownAccount,
}

/// Errors from lifecycle operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates account creation, snapshot application, and reconciliation.
pub struct AccountLifecycle {
    provider: Arc<dyn ProviderClient>,
    store: Arc<dyn AccountStore>,
    onboarding_return_url: String,
    onboarding_refresh_url: String,
}

impl AccountLifecycle {
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        store: Arc<dyn AccountStore>,
        onboarding_return_url: impl Into<String>,
        onboarding_refresh_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            onboarding_return_url: onboarding_return_url.into(),
            onboarding_refresh_url: onboarding_refresh_url.into(),
        }
    }

    /// Creates a provider account and persists the initial pending record.
    ///
    /// Deliberately not idempotent: re-invocation for a user with an
    /// existing pending record creates a fresh provider account and
    /// replaces the stored record. Webhooks for the abandoned account then
    /// hit the unknown-account no-op path.
    ///
    /// # Errors
    ///
    /// Provider `Client` errors surface to the caller as rejected
    /// requests; `Transient` and `Config` errors as server faults.
    pub async fn create_account(
        &self,
        cmd: CreateAccountCommand,
    ) -> Result<CreateAccountResult, AccountError> {
        let account = self
            .provider
            .create_account(CreateAccountRequest {
                user_id: cmd.user_id.clone(),
                country: cmd.country,
                email: cmd.email,
            })
            .await?;

        let link = self
            .provider
            .create_onboarding_link(
                &account.id,
                &self.onboarding_return_url,
                &self.onboarding_refresh_url,
            )
            .await?;

        let record = AccountRecord::from_snapshot(
            cmd.user_id.clone(),
            &account.snapshot(),
            Some(link.url.clone()),
            Timestamp::now(),
        );
        self.store.upsert(record).await?;

        tracing::info!(
            user_id = %cmd.user_id,
            provider_account_id = %account.id,
            "registered provider account, onboarding pending"
        );

        Ok(CreateAccountResult {
            onboarding_url: link.url,
            provider_account_id: account.id,
        })
    }

    /// Applies a complete provider snapshot to the owning record.
    ///
    /// The shared mutation primitive for both the webhook path and the
    /// refresh path. Idempotent and commutative under last-write-wins:
    /// each snapshot fully replaces the record, so delivery order only
    /// matters for which snapshot lands last.
    pub async fn apply_provider_snapshot(
        &self,
        snapshot: ProviderSnapshot,
    ) -> Result<SnapshotOutcome, StoreError> {
        let existing = self
            .store
            .get_by_provider_id(&snapshot.provider_account_id)
            .await?;

        let Some(existing) = existing else {
            // A webhook can arrive before the registration write, or
            // belong to an account registered by another environment.
            tracing::info!(
                provider_account_id = %snapshot.provider_account_id,
                "snapshot for unregistered provider account, skipping"
            );
            return Ok(SnapshotOutcome::UnknownAccount);
        };

        let updated = existing.apply_snapshot(&snapshot, Timestamp::now());
        self.store.upsert(updated).await?;

        tracing::debug!(
            provider_account_id = %snapshot.provider_account_id,
            charges_enabled = snapshot.charges_enabled,
            payouts_enabled = snapshot.payouts_enabled,
            "applied provider snapshot"
        );

        Ok(SnapshotOutcome::Applied)
    }

    /// Read path: returns the user's record, optionally refreshed from
    /// the provider first.
    ///
    /// Without a stored record this returns `None` and never contacts the
    /// provider. When a refresh fails (network, timeout, provider outage)
    /// the last stored record is returned instead: stale data is preferred
    /// over an unavailable read path.
    pub async fn reconcile(
        &self,
        user_id: &UserId,
        refresh_from_provider: bool,
    ) -> Result<Option<AccountRecord>, AccountError> {
        let Some(record) = self.store.get_by_user(user_id).await? else {
            return Ok(None);
        };

        if !refresh_from_provider {
            return Ok(Some(record));
        }

        match self
            .provider
            .retrieve_account(&record.provider_account_id)
            .await
        {
            Ok(account) => {
                self.apply_provider_snapshot(account.snapshot()).await?;
                let fresh = self.store.get_by_user(user_id).await?;
                Ok(fresh.or(Some(record)))
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %user_id,
                    provider_account_id = %record.provider_account_id,
                    error = %err,
                    "provider refresh failed, returning stored record"
                );
                Ok(Some(record))
            }
        }
    }
}
