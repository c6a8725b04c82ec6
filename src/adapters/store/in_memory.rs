//! In-memory implementation of the account store.
//!
//! Backs tests and local development. A single `RwLock` over the primary
//! map and the provider-id index makes every upsert atomic per key: a
//! webhook racing a refresh sees either the whole old record or the whole
//! new one, never a partial write.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::account::AccountRecord;
use crate::domain::foundation::UserId;
use crate::ports::{AccountStore, StoreError};

#[derive(Default)]
struct Inner {
    by_user: HashMap<UserId, AccountRecord>,
    user_by_provider: HashMap<String, UserId>,
}

/// In-memory account store.
#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Inner>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held. Test helper.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_user.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<AccountRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.by_user.get(user_id).cloned())
    }

    async fn get_by_provider_id(
        &self,
        provider_account_id: &str,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let inner = self.inner.read().await;
        let record = inner
            .user_by_provider
            .get(provider_account_id)
            .and_then(|user_id| inner.by_user.get(user_id))
            .cloned();
        Ok(record)
    }

    async fn upsert(&self, record: AccountRecord) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if let Some(owner) = inner.user_by_provider.get(&record.provider_account_id) {
            if owner != &record.user_id {
                return Err(StoreError::ProviderIdConflict(
                    record.provider_account_id.clone(),
                ));
            }
        }

        // Re-onboarding replaces the user's provider account; the old id
        // must stop routing webhooks to this user.
        if let Some(previous) = inner.by_user.get(&record.user_id) {
            if previous.provider_account_id != record.provider_account_id {
                let stale = previous.provider_account_id.clone();
                inner.user_by_provider.remove(&stale);
            }
        }

        inner
            .user_by_provider
            .insert(record.provider_account_id.clone(), record.user_id.clone());
        inner.by_user.insert(record.user_id.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountStatus, ProviderSnapshot};
    use crate::domain::foundation::Timestamp;
    use std::sync::Arc;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn record(user_id: &str, account_id: &str) -> AccountRecord {
        AccountRecord::from_snapshot(
            user(user_id),
            &ProviderSnapshot {
                provider_account_id: account_id.to_string(),
                charges_enabled: false,
                payouts_enabled: false,
                details_submitted: false,
                email: None,
                country: "US".to_string(),
                default_currency: "usd".to_string(),
            },
            None,
            Timestamp::from_unix_secs(1000),
        )
    }

    #[tokio::test]
    async fn get_by_user_roundtrips_upsert() {
        let store = InMemoryAccountStore::new();
        store.upsert(record("u1", "acct_1")).await.unwrap();

        let found = store.get_by_user(&user("u1")).await.unwrap().unwrap();

        assert_eq!(found.provider_account_id, "acct_1");
        assert_eq!(found.status, AccountStatus::Pending);
    }

    #[tokio::test]
    async fn get_by_provider_id_finds_owning_record() {
        let store = InMemoryAccountStore::new();
        store.upsert(record("u1", "acct_1")).await.unwrap();

        let found = store.get_by_provider_id("acct_1").await.unwrap().unwrap();

        assert_eq!(found.user_id, user("u1"));
    }

    #[tokio::test]
    async fn lookups_miss_for_unknown_keys() {
        let store = InMemoryAccountStore::new();

        assert!(store.get_by_user(&user("u-missing")).await.unwrap().is_none());
        assert!(store.get_by_provider_id("acct_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let store = InMemoryAccountStore::new();
        store.upsert(record("u1", "acct_1")).await.unwrap();

        let mut updated = record("u1", "acct_1");
        updated.charges_enabled = true;
        store.upsert(updated).await.unwrap();

        let found = store.get_by_user(&user("u1")).await.unwrap().unwrap();
        assert!(found.charges_enabled);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn provider_id_cannot_be_claimed_by_second_user() {
        let store = InMemoryAccountStore::new();
        store.upsert(record("u1", "acct_shared")).await.unwrap();

        let result = store.upsert(record("u2", "acct_shared")).await;

        assert!(matches!(result, Err(StoreError::ProviderIdConflict(_))));
        let owner = store.get_by_provider_id("acct_shared").await.unwrap().unwrap();
        assert_eq!(owner.user_id, user("u1"));
    }

    #[tokio::test]
    async fn reonboarding_reroutes_the_provider_index() {
        let store = InMemoryAccountStore::new();
        store.upsert(record("u1", "acct_old")).await.unwrap();
        store.upsert(record("u1", "acct_new")).await.unwrap();

        assert!(store.get_by_provider_id("acct_old").await.unwrap().is_none());
        let found = store.get_by_provider_id("acct_new").await.unwrap().unwrap();
        assert_eq!(found.user_id, user("u1"));

        // The freed id can now be registered by someone else.
        store.upsert(record("u2", "acct_old")).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_upserts_never_interleave_partial_state() {
        let store = Arc::new(InMemoryAccountStore::new());

        let mut charges_only = record("u1", "acct_1");
        charges_only.charges_enabled = true;
        let mut payouts_only = record("u1", "acct_1");
        payouts_only.payouts_enabled = true;

        let mut handles = Vec::new();
        for rec in [charges_only.clone(), payouts_only.clone()] {
            for _ in 0..25 {
                let store = store.clone();
                let rec = rec.clone();
                handles.push(tokio::spawn(async move { store.upsert(rec).await }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // The final record is exactly one of the two writes, whole.
        let found = store.get_by_user(&user("u1")).await.unwrap().unwrap();
        assert!(found == charges_only || found == payouts_only);
    }
}
