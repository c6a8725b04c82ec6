//! Configurable mock implementation of the provider client port.
//!
//! Holds provider-side account state in memory and supports scripted
//! failures, letting tests drive every lifecycle path without the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{
    CreateAccountRequest, OnboardingLink, ProviderAccount, ProviderClient, ProviderError,
};

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, ProviderAccount>,
    created: u32,
    retrieved: u32,
    fail_create: Option<ProviderError>,
    fail_link: Option<ProviderError>,
    fail_retrieve: Option<ProviderError>,
}

/// Mock provider client with scripted behavior.
#[derive(Default)]
pub struct MockProviderClient {
    state: Mutex<MockState>,
}

impl MockProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds provider-side state for an account id, simulating changes the
    /// user completed on the provider's hosted pages.
    pub fn set_account(&self, account: ProviderAccount) {
        let mut state = self.state.lock().unwrap();
        state.accounts.insert(account.id.clone(), account);
    }

    /// Scripts the next `create_account` calls to fail.
    pub fn fail_create_with(&self, err: ProviderError) {
        self.state.lock().unwrap().fail_create = Some(err);
    }

    /// Scripts the next `create_onboarding_link` calls to fail.
    pub fn fail_link_with(&self, err: ProviderError) {
        self.state.lock().unwrap().fail_link = Some(err);
    }

    /// Scripts the next `retrieve_account` calls to fail.
    pub fn fail_retrieve_with(&self, err: ProviderError) {
        self.state.lock().unwrap().fail_retrieve = Some(err);
    }

    /// Number of accounts created so far.
    pub fn created_count(&self) -> u32 {
        self.state.lock().unwrap().created
    }

    /// Number of retrieve calls served or failed.
    pub fn retrieve_count(&self) -> u32 {
        self.state.lock().unwrap().retrieved
    }
}

fn currency_for(country: &str) -> &'static str {
    match country {
        "US" => "usd",
        "GB" => "gbp",
        "DE" | "FR" | "ES" | "IT" | "NL" => "eur",
        "CA" => "cad",
        _ => "usd",
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<ProviderAccount, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_create.clone() {
            return Err(err);
        }

        state.created += 1;
        let account = ProviderAccount {
            id: format!("acct_{}", Uuid::new_v4().simple()),
            email: request.email,
            country: request.country.clone(),
            default_currency: currency_for(&request.country).to_string(),
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
        };
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        _return_url: &str,
        _refresh_url: &str,
    ) -> Result<OnboardingLink, ProviderError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = state.fail_link.clone() {
            return Err(err);
        }
        if !state.accounts.contains_key(account_id) {
            return Err(ProviderError::client(format!(
                "no such account: {account_id}"
            )));
        }

        Ok(OnboardingLink {
            url: format!(
                "https://connect.mock.invalid/setup/{}/{}",
                account_id,
                Uuid::new_v4().simple()
            ),
            expires_at: chrono::Utc::now().timestamp() + 300,
        })
    }

    async fn retrieve_account(&self, account_id: &str) -> Result<ProviderAccount, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.retrieved += 1;
        if let Some(err) = state.fail_retrieve.clone() {
            return Err(err);
        }

        state
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| ProviderError::client(format!("no such account: {account_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn request(country: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            user_id: UserId::new("u1").unwrap(),
            country: country.to_string(),
            email: Some("merchant@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn created_accounts_start_fully_disabled() {
        let mock = MockProviderClient::new();

        let account = mock.create_account(request("DE")).await.unwrap();

        assert!(account.id.starts_with("acct_"));
        assert_eq!(account.default_currency, "eur");
        assert!(!account.charges_enabled);
        assert!(!account.payouts_enabled);
        assert!(!account.details_submitted);
    }

    #[tokio::test]
    async fn created_accounts_are_retrievable() {
        let mock = MockProviderClient::new();
        let account = mock.create_account(request("US")).await.unwrap();

        let fetched = mock.retrieve_account(&account.id).await.unwrap();

        assert_eq!(fetched, account);
        assert_eq!(mock.retrieve_count(), 1);
    }

    #[tokio::test]
    async fn onboarding_links_require_an_existing_account() {
        let mock = MockProviderClient::new();

        let result = mock
            .create_onboarding_link("acct_ghost", "https://r", "https://f")
            .await;

        assert!(matches!(result, Err(ProviderError::Client { .. })));
    }

    #[tokio::test]
    async fn set_account_overrides_provider_state() {
        let mock = MockProviderClient::new();
        let account = mock.create_account(request("US")).await.unwrap();

        mock.set_account(ProviderAccount {
            charges_enabled: true,
            payouts_enabled: true,
            details_submitted: true,
            ..account.clone()
        });

        let fetched = mock.retrieve_account(&account.id).await.unwrap();
        assert!(fetched.charges_enabled && fetched.payouts_enabled);
    }

    #[tokio::test]
    async fn scripted_failures_are_returned() {
        let mock = MockProviderClient::new();
        mock.fail_create_with(ProviderError::transient("boom"));

        let result = mock.create_account(request("US")).await;

        assert!(matches!(result, Err(ProviderError::Transient(_))));
    }
}
