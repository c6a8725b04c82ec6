//! Account status query service.
//!
//! Pure read orchestration over `AccountLifecycle::reconcile`; holds no
//! state of its own.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::account::{AccountRecord, AccountStatus};
use crate::domain::foundation::UserId;

use super::lifecycle::{AccountError, AccountLifecycle};

/// Caller-facing view of a user's payment account eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatusView {
    pub has_account: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub onboarding_completed: bool,
    pub status: AccountStatus,
}

impl AccountStatusView {
    fn no_account() -> Self {
        Self {
            has_account: false,
            charges_enabled: false,
            payouts_enabled: false,
            onboarding_completed: false,
            status: AccountStatus::None,
        }
    }

    fn from_record(record: &AccountRecord) -> Self {
        Self {
            has_account: true,
            charges_enabled: record.charges_enabled,
            payouts_enabled: record.payouts_enabled,
            onboarding_completed: record.onboarding_completed(),
            status: record.status,
        }
    }
}

/// Read service answering account status queries.
pub struct StatusQueryService {
    lifecycle: Arc<AccountLifecycle>,
}

impl StatusQueryService {
    pub fn new(lifecycle: Arc<AccountLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Returns the user's eligibility view, optionally refreshing from the
    /// provider first. A failed refresh degrades to the stored record
    /// inside `reconcile`, so this only errors on store failures.
    pub async fn account_status(
        &self,
        user_id: &UserId,
        refresh_from_provider: bool,
    ) -> Result<AccountStatusView, AccountError> {
        let view = match self
            .lifecycle
            .reconcile(user_id, refresh_from_provider)
            .await?
        {
            Some(record) => AccountStatusView::from_record(&record),
            None => AccountStatusView::no_account(),
        };
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryAccountStore;
    use crate::adapters::stripe::MockProviderClient;
    use crate::application::CreateAccountCommand;
    use crate::ports::ProviderAccount;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn service() -> (StatusQueryService, Arc<MockProviderClient>, Arc<AccountLifecycle>) {
        let provider = Arc::new(MockProviderClient::new());
        let store = Arc::new(InMemoryAccountStore::new());
        let lifecycle = Arc::new(AccountLifecycle::new(
            provider.clone(),
            store,
            "https://app.example.com/return",
            "https://app.example.com/refresh",
        ));
        (StatusQueryService::new(lifecycle.clone()), provider, lifecycle)
    }

    #[tokio::test]
    async fn missing_account_reports_none_status() {
        let (service, provider, _lifecycle) = service();

        let view = service.account_status(&user("u-none"), true).await.unwrap();

        assert!(!view.has_account);
        assert_eq!(view.status, AccountStatus::None);
        assert!(!view.onboarding_completed);
        // No record, no provider round trip.
        assert_eq!(provider.retrieve_count(), 0);
    }

    #[tokio::test]
    async fn pending_account_reports_pending_view() {
        let (service, _provider, lifecycle) = service();
        lifecycle
            .create_account(CreateAccountCommand {
                user_id: user("u1"),
                country: "US".to_string(),
                email: None,
            })
            .await
            .unwrap();

        let view = service.account_status(&user("u1"), false).await.unwrap();

        assert!(view.has_account);
        assert_eq!(view.status, AccountStatus::Pending);
        assert!(!view.charges_enabled);
        assert!(!view.payouts_enabled);
        assert!(!view.onboarding_completed);
    }

    #[tokio::test]
    async fn refresh_reflects_provider_side_completion() {
        let (service, provider, lifecycle) = service();
        let created = lifecycle
            .create_account(CreateAccountCommand {
                user_id: user("u1"),
                country: "US".to_string(),
                email: None,
            })
            .await
            .unwrap();

        provider.set_account(ProviderAccount {
            id: created.provider_account_id,
            email: None,
            country: "US".to_string(),
            default_currency: "usd".to_string(),
            charges_enabled: true,
            payouts_enabled: true,
            details_submitted: true,
        });

        let view = service.account_status(&user("u1"), true).await.unwrap();

        assert_eq!(view.status, AccountStatus::Active);
        assert!(view.onboarding_completed);
    }
}
