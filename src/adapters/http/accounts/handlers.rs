//! HTTP handlers for account onboarding, status, and webhook endpoints.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    AccountError, AccountLifecycle, ApplyWebhookHandler, CreateAccountCommand, StatusQueryService,
};
use crate::domain::foundation::UserId;
use crate::ports::ProviderError;

use super::dto::{
    AccountStatusResponse, CreateAccountBody, CreateAccountResponse, ErrorResponse, StatusParams,
    WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the account routes.
///
/// Cloned per request; every dependency is Arc-wrapped and constructed
/// once at startup by the composition root.
#[derive(Clone)]
pub struct AccountAppState {
    pub lifecycle: Arc<AccountLifecycle>,
    pub status_query: Arc<StatusQueryService>,
    pub webhooks: Arc<ApplyWebhookHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the request.
///
/// Session issuance happens upstream; this service trusts the identity
/// header its gateway injects.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection for requests without a usable identity header.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/accounts - Start onboarding, returning the provider-hosted URL.
pub async fn create_account(
    State(state): State<AccountAppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateAccountBody>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .lifecycle
        .create_account(CreateAccountCommand {
            user_id: user.user_id,
            country: body.country,
            email: body.email,
        })
        .await?;

    let response = CreateAccountResponse {
        onboarding_url: result.onboarding_url,
        provider_account_id: result.provider_account_id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/accounts/status - Current eligibility view for the caller.
pub async fn account_status(
    State(state): State<AccountAppState>,
    user: AuthenticatedUser,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .status_query
        .account_status(&user.user_id, params.refresh)
        .await?;

    Ok(Json(AccountStatusResponse::from(view)))
}

/// POST /api/webhooks/stripe - Inbound provider events.
///
/// Takes the raw body bytes: the signature covers them exactly, so nothing
/// may parse or transform the body first. Answers 200 for every verified
/// delivery whether or not it was actionable, 400 on verification failure,
/// and 500 when a verified event could not be stored (provider retries).
pub async fn handle_stripe_webhook(
    State(state): State<AccountAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let Some(signature) = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        let error = ErrorResponse::new("MISSING_SIGNATURE", "Missing Stripe-Signature header");
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    };

    match state.webhooks.handle(&body, signature).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(err) => {
            let error = ErrorResponse::new("WEBHOOK_REJECTED", err.to_string());
            (err.status_code(), Json(error)).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error translating lifecycle failures into HTTP responses.
#[derive(Debug)]
pub struct ApiError(AccountError);

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self.0 {
            AccountError::Provider(ProviderError::Client { .. }) => {
                (StatusCode::BAD_REQUEST, "PROVIDER_REJECTED")
            }
            AccountError::Provider(ProviderError::Transient(_)) => {
                (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE")
            }
            AccountError::Provider(ProviderError::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_MISCONFIGURED")
            }
            AccountError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "account request failed");
        }

        let body = ErrorResponse::new(code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}
