//! End-to-end onboarding and reconciliation flows.
//!
//! Wires the real webhook verifier (HMAC-signed payloads), the mock
//! provider client, and the in-memory store through the public crate API,
//! covering the full pending -> active lifecycle, rejection paths, and the
//! refresh fallback.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use paysync::adapters::store::InMemoryAccountStore;
use paysync::adapters::stripe::MockProviderClient;
use paysync::application::{
    AccountLifecycle, ApplyWebhookHandler, CreateAccountCommand, StatusQueryService,
    WebhookOutcome,
};
use paysync::domain::account::{AccountStatus, WebhookError, WebhookVerifier};
use paysync::domain::foundation::UserId;
use paysync::ports::{AccountStore, ProviderAccount, ProviderError};

const SECRET: &str = "whsec_integration_secret";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    provider: Arc<MockProviderClient>,
    store: Arc<InMemoryAccountStore>,
    lifecycle: Arc<AccountLifecycle>,
    webhooks: ApplyWebhookHandler,
    status: StatusQueryService,
}

impl Harness {
    fn new() -> Self {
        let provider = Arc::new(MockProviderClient::new());
        let store = Arc::new(InMemoryAccountStore::new());
        let lifecycle = Arc::new(AccountLifecycle::new(
            provider.clone(),
            store.clone(),
            "https://app.example.com/payments/return",
            "https://app.example.com/payments/refresh",
        ));
        let webhooks =
            ApplyWebhookHandler::new(WebhookVerifier::new(SECRET), lifecycle.clone());
        let status = StatusQueryService::new(lifecycle.clone());

        Self {
            provider,
            store,
            lifecycle,
            webhooks,
            status,
        }
    }

    async fn onboard(&self, user: &str) -> String {
        self.lifecycle
            .create_account(CreateAccountCommand {
                user_id: UserId::new(user).unwrap(),
                country: "US".to_string(),
                email: Some(format!("{user}@example.com")),
            })
            .await
            .expect("account creation should succeed")
            .provider_account_id
    }

    async fn status_of(&self, user: &str, refresh: bool) -> paysync::application::AccountStatusView {
        self.status
            .account_status(&UserId::new(user).unwrap(), refresh)
            .await
            .expect("status query should succeed")
    }
}

fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn header_at(timestamp: i64, payload: &str, secret: &str) -> String {
    format!("t={},v1={}", timestamp, sign(secret, timestamp, payload))
}

fn account_updated(event_id: &str, account_id: &str, charges: bool, payouts: bool, details: bool) -> String {
    serde_json::json!({
        "id": event_id,
        "type": "account.updated",
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": account_id,
                "email": "merchant@example.com",
                "country": "US",
                "default_currency": "usd",
                "charges_enabled": charges,
                "payouts_enabled": payouts,
                "details_submitted": details
            }
        },
        "livemode": false
    })
    .to_string()
}

// =============================================================================
// Onboarding Lifecycle
// =============================================================================

#[tokio::test]
async fn webhooks_walk_the_account_from_pending_to_active() {
    let h = Harness::new();
    let acct = h.onboard("u1").await;

    let view = h.status_of("u1", false).await;
    assert!(view.has_account);
    assert_eq!(view.status, AccountStatus::Pending);
    assert!(!view.charges_enabled && !view.payouts_enabled);

    // First webhook: charges enabled, payouts still pending.
    let payload = account_updated("evt_1", &acct, true, false, false);
    let now = chrono::Utc::now().timestamp();
    let outcome = h
        .webhooks
        .handle(payload.as_bytes(), &header_at(now, &payload, SECRET))
        .await
        .unwrap();
    assert_eq!(outcome, WebhookOutcome::Applied);

    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Pending);
    assert!(view.charges_enabled);
    assert!(!view.onboarding_completed);

    // Second webhook: both capabilities enabled.
    let payload = account_updated("evt_2", &acct, true, true, true);
    let now = chrono::Utc::now().timestamp();
    h.webhooks
        .handle(payload.as_bytes(), &header_at(now, &payload, SECRET))
        .await
        .unwrap();

    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Active);
    assert!(view.onboarding_completed);
}

#[tokio::test]
async fn compliance_hold_regresses_an_active_account() {
    let h = Harness::new();
    let acct = h.onboard("u1").await;

    for (event, charges, payouts) in [("evt_1", true, true), ("evt_2", false, true)] {
        let payload = account_updated(event, &acct, charges, payouts, true);
        let now = chrono::Utc::now().timestamp();
        h.webhooks
            .handle(payload.as_bytes(), &header_at(now, &payload, SECRET))
            .await
            .unwrap();
    }

    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Restricted);
    assert!(!view.onboarding_completed);

    // The record survives the regression as an audit trail.
    let record = h.store.get_by_provider_id(&acct).await.unwrap().unwrap();
    assert_eq!(record.user_id, UserId::new("u1").unwrap());
}

// =============================================================================
// Webhook Rejection
// =============================================================================

#[tokio::test]
async fn wrong_secret_signature_is_rejected_without_mutation() {
    let h = Harness::new();
    let acct = h.onboard("u1").await;

    let payload = account_updated("evt_1", &acct, true, true, true);
    let now = chrono::Utc::now().timestamp();
    let result = h
        .webhooks
        .handle(
            payload.as_bytes(),
            &header_at(now, &payload, "whsec_not_the_secret"),
        )
        .await;

    assert!(matches!(result, Err(WebhookError::BadSignature)));
    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Pending);
}

#[tokio::test]
async fn six_minute_old_delivery_is_rejected_without_mutation() {
    let h = Harness::new();
    let acct = h.onboard("u1").await;

    let payload = account_updated("evt_1", &acct, true, true, true);
    let stale = chrono::Utc::now().timestamp() - 360;
    let result = h
        .webhooks
        .handle(payload.as_bytes(), &header_at(stale, &payload, SECRET))
        .await;

    assert!(matches!(result, Err(WebhookError::Stale)));
    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Pending);
}

#[tokio::test]
async fn unknown_account_webhook_is_a_verified_noop() {
    let h = Harness::new();
    h.onboard("u1").await;

    let payload = account_updated("evt_1", "acct_other_env", true, true, true);
    let now = chrono::Utc::now().timestamp();
    let outcome = h
        .webhooks
        .handle(payload.as_bytes(), &header_at(now, &payload, SECRET))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::UnknownAccount);
    assert_eq!(h.store.len().await, 1);
    assert!(h
        .store
        .get_by_provider_id("acct_other_env")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn replaying_the_same_event_converges_on_the_same_record() {
    let h = Harness::new();
    let acct = h.onboard("u1").await;

    let payload = account_updated("evt_1", &acct, true, true, true);
    for _ in 0..3 {
        let now = chrono::Utc::now().timestamp();
        h.webhooks
            .handle(payload.as_bytes(), &header_at(now, &payload, SECRET))
            .await
            .unwrap();
    }

    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Active);
    assert_eq!(h.store.len().await, 1);
}

// =============================================================================
// Refresh Fallback
// =============================================================================

#[tokio::test]
async fn refresh_folds_in_provider_state_when_no_webhook_arrived() {
    let h = Harness::new();
    let acct = h.onboard("u1").await;

    h.provider.set_account(ProviderAccount {
        id: acct,
        email: Some("u1@example.com".to_string()),
        country: "US".to_string(),
        default_currency: "usd".to_string(),
        charges_enabled: true,
        payouts_enabled: true,
        details_submitted: true,
    });

    let view = h.status_of("u1", true).await;

    assert_eq!(view.status, AccountStatus::Active);
    assert!(view.onboarding_completed);

    // The refreshed state is durable: later plain reads see it too.
    let view = h.status_of("u1", false).await;
    assert_eq!(view.status, AccountStatus::Active);
}

#[tokio::test]
async fn refresh_timeout_degrades_to_the_stored_record() {
    let h = Harness::new();
    h.onboard("u1").await;
    h.provider
        .fail_retrieve_with(ProviderError::transient("request timed out"));

    let view = h.status_of("u1", true).await;

    assert!(view.has_account);
    assert_eq!(view.status, AccountStatus::Pending);
}

#[tokio::test]
async fn status_for_unknown_user_never_contacts_the_provider() {
    let h = Harness::new();

    let view = h.status_of("stranger", true).await;

    assert!(!view.has_account);
    assert_eq!(view.status, AccountStatus::None);
    assert_eq!(h.provider.retrieve_count(), 0);
}
