//! Request and response DTOs for the account endpoints.

use serde::{Deserialize, Serialize};

use crate::application::AccountStatusView;
use crate::domain::account::AccountStatus;

/// POST /api/accounts request body.
#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    /// Two-letter country code for the new account.
    pub country: String,
    /// Account holder email, when known.
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/accounts response body.
#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub onboarding_url: String,
    pub provider_account_id: String,
}

/// GET /api/accounts/status query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    /// When true, fold in live provider state before answering.
    #[serde(default)]
    pub refresh: bool,
}

/// GET /api/accounts/status response body.
#[derive(Debug, Serialize)]
pub struct AccountStatusResponse {
    pub has_account: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub onboarding_completed: bool,
    pub status: AccountStatus,
}

impl From<AccountStatusView> for AccountStatusResponse {
    fn from(view: AccountStatusView) -> Self {
        Self {
            has_account: view.has_account,
            charges_enabled: view.charges_enabled,
            payouts_enabled: view.payouts_enabled,
            onboarding_completed: view.onboarding_completed,
            status: view.status,
        }
    }
}

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error envelope for all account endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
