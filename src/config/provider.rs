//! Payment provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Provider secret API key
    #[serde(default)]
    pub api_key: String,

    /// Webhook signing secret
    #[serde(default)]
    pub webhook_secret: String,

    /// URL users land on after completing onboarding
    #[serde(default)]
    pub onboarding_return_url: String,

    /// URL users land on when an onboarding link expires
    #[serde(default)]
    pub onboarding_refresh_url: String,

    /// Base URL for the provider API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ProviderConfig {
    /// Check if using test-mode credentials
    pub fn is_test_mode(&self) -> bool {
        self.api_key.starts_with("sk_test_")
    }

    /// Check if using live-mode credentials
    pub fn is_live_mode(&self) -> bool {
        self.api_key.starts_with("sk_live_")
    }

    /// Validate provider configuration
    ///
    /// Absence of the API key or signing secret is fatal at startup, not a
    /// per-request error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER_API_KEY"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidProviderKey);
        }
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }

        for url in [&self.onboarding_return_url, &self.onboarding_refresh_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidOnboardingUrl);
            }
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            webhook_secret: String::new(),
            onboarding_return_url: String::new(),
            onboarding_refresh_url: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProviderConfig {
        ProviderConfig {
            api_key: "sk_test_abcd1234".to_string(),
            webhook_secret: "whsec_xyz789".to_string(),
            onboarding_return_url: "https://app.example.com/payments/return".to_string(),
            onboarding_refresh_url: "https://app.example.com/payments/refresh".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_and_live_mode_detection() {
        let mut config = valid();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());

        config.api_key = "sk_live_abcd1234".to_string();
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn missing_api_key_fails() {
        let config = ProviderConfig {
            api_key: String::new(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("PROVIDER_API_KEY"))
        ));
    }

    #[test]
    fn missing_webhook_secret_fails() {
        let config = ProviderConfig {
            webhook_secret: String::new(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("PROVIDER_WEBHOOK_SECRET"))
        ));
    }

    #[test]
    fn wrong_api_key_prefix_fails() {
        let config = ProviderConfig {
            api_key: "pk_test_abcd".to_string(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidProviderKey)
        ));
    }

    #[test]
    fn wrong_webhook_secret_prefix_fails() {
        let config = ProviderConfig {
            webhook_secret: "secret_xyz".to_string(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidWebhookSecret)
        ));
    }

    #[test]
    fn relative_onboarding_url_fails() {
        let config = ProviderConfig {
            onboarding_return_url: "/payments/return".to_string(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidOnboardingUrl)
        ));
    }
}
