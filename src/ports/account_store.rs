//! Account store port - durable keyed storage for account records.
//!
//! One record per user, with a secondary unique lookup by provider account
//! id for webhook routing. `upsert` replaces the full record and must be
//! atomic per key so a webhook racing a refresh can never interleave
//! partial writes. Only the account lifecycle mutates the store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::AccountRecord;
use crate::domain::foundation::UserId;

/// Errors from account store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The provider account id is already linked to a different user.
    /// The user-to-provider-account mapping is strictly one to one.
    #[error("provider account {0} is already linked to a different user")]
    ProviderIdConflict(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Port for account record storage.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up the record for a user.
    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<AccountRecord>, StoreError>;

    /// Look up the record owning a provider account id.
    async fn get_by_provider_id(
        &self,
        provider_account_id: &str,
    ) -> Result<Option<AccountRecord>, StoreError>;

    /// Insert or replace the record for `record.user_id`.
    ///
    /// Full-record, last-writer-wins, atomic per user key. Records are
    /// never deleted; regressions overwrite in place.
    async fn upsert(&self, record: AccountRecord) -> Result<(), StoreError>;
}
