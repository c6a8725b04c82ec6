//! Stripe implementation of the provider client port.
//!
//! Talks to the Stripe Connect API over reqwest with form-encoded bodies
//! and basic auth, the way the Stripe HTTP API expects. Every call carries
//! the configured request timeout so a slow provider can never block a
//! caller indefinitely.
//!
//! # Error classification
//!
//! - 401/403: `ProviderError::Config` (bad credentials, fatal)
//! - 429 and 5xx: `ProviderError::Transient` (retryable)
//! - other 4xx: `ProviderError::Client` with Stripe's error code
//! - network failures and timeouts: `ProviderError::Transient`

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::config::ProviderConfig;
use crate::ports::{
    CreateAccountRequest, OnboardingLink, ProviderAccount, ProviderClient, ProviderError,
};

use super::types::{StripeAccount, StripeAccountLink, StripeErrorEnvelope};

use async_trait::async_trait;

/// Stripe Connect API client.
pub struct StripeConnectClient {
    api_key: SecretString,
    api_base_url: String,
    http: reqwest::Client,
}

impl StripeConnectClient {
    /// Builds a client from validated configuration.
    ///
    /// Constructed once at process start and shared read-only; there is no
    /// lazily initialized global handle.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            api_key: SecretString::new(config.api_key.clone()),
            api_base_url: config.api_base_url.clone(),
            http,
        })
    }

    /// Maps a non-success response into the provider error taxonomy.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<StripeErrorEnvelope> = serde_json::from_str(&body).ok();
        let message = parsed
            .as_ref()
            .and_then(|e| e.error.message.clone())
            .unwrap_or_else(|| format!("http status {status}"));
        let code = parsed.and_then(|e| e.error.code);

        classify(status, message, code)
    }

    async fn send_form(
        &self,
        url: String,
        params: Vec<(&'static str, String)>,
    ) -> Result<reqwest::Response, ProviderError> {
        self.http
            .post(&url)
            .basic_auth(self.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(map_transport_error)
    }
}

fn classify(status: StatusCode, message: String, code: Option<String>) -> ProviderError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ProviderError::config(format!("provider rejected credentials: {message}"))
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ProviderError::transient(message)
    } else {
        match code {
            Some(code) => ProviderError::client_with_code(message, code),
            None => ProviderError::client(message),
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::transient("request timed out")
    } else {
        ProviderError::transient(err.to_string())
    }
}

fn decode_error(err: reqwest::Error) -> ProviderError {
    ProviderError::transient(format!("unexpected response body: {err}"))
}

#[async_trait]
impl ProviderClient for StripeConnectClient {
    async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<ProviderAccount, ProviderError> {
        let url = format!("{}/v1/accounts", self.api_base_url);

        let mut params = vec![
            ("type", "express".to_string()),
            ("country", request.country.clone()),
            ("capabilities[card_payments][requested]", "true".to_string()),
            ("capabilities[transfers][requested]", "true".to_string()),
            ("metadata[user_id]", request.user_id.to_string()),
        ];
        if let Some(email) = &request.email {
            params.push(("email", email.clone()));
        }

        let response = self.send_form(url, params).await?;
        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(error = %err, "stripe create_account failed");
            return Err(err);
        }

        let account: StripeAccount = response.json().await.map_err(decode_error)?;
        Ok(account.into())
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        return_url: &str,
        refresh_url: &str,
    ) -> Result<OnboardingLink, ProviderError> {
        let url = format!("{}/v1/account_links", self.api_base_url);

        let params = vec![
            ("account", account_id.to_string()),
            ("return_url", return_url.to_string()),
            ("refresh_url", refresh_url.to_string()),
            ("type", "account_onboarding".to_string()),
        ];

        let response = self.send_form(url, params).await?;
        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(error = %err, account_id, "stripe create_onboarding_link failed");
            return Err(err);
        }

        let link: StripeAccountLink = response.json().await.map_err(decode_error)?;
        Ok(link.into())
    }

    async fn retrieve_account(&self, account_id: &str) -> Result<ProviderAccount, ProviderError> {
        let url = format!("{}/v1/accounts/{}", self.api_base_url, account_id);

        let response = self
            .http
            .get(&url)
            .basic_auth(self.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::warn!(error = %err, account_id, "stripe retrieve_account failed");
            return Err(err);
        }

        let account: StripeAccount = response.json().await.map_err(decode_error)?;
        Ok(account.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_classifies_as_config_error() {
        let err = classify(StatusCode::UNAUTHORIZED, "invalid api key".to_string(), None);
        assert!(matches!(err, ProviderError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn rate_limit_classifies_as_transient() {
        let err = classify(StatusCode::TOO_MANY_REQUESTS, "rate limited".to_string(), None);
        assert!(err.is_retryable());
    }

    #[test]
    fn server_errors_classify_as_transient() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = classify(status, "upstream failure".to_string(), None);
            assert!(err.is_retryable(), "{status} should be retryable");
        }
    }

    #[test]
    fn bad_request_classifies_as_client_with_code() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            "Invalid country: XX".to_string(),
            Some("country_unsupported".to_string()),
        );

        match err {
            ProviderError::Client {
                message,
                provider_code,
            } => {
                assert_eq!(message, "Invalid country: XX");
                assert_eq!(provider_code.as_deref(), Some("country_unsupported"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn not_found_classifies_as_client() {
        let err = classify(StatusCode::NOT_FOUND, "No such account".to_string(), None);
        assert!(matches!(err, ProviderError::Client { .. }));
        assert!(!err.is_retryable());
    }
}
