//! Stripe provider adapter.
//!
//! Implements the `ProviderClient` port against the Stripe Connect API,
//! plus a configurable mock for tests and local development.
//!
//! # Security
//!
//! - API keys are handled via `secrecy::SecretString`
//! - Webhook signature verification lives in the domain layer and is
//!   shared by every transport

mod client;
mod mock_client;
mod types;

pub use client::StripeConnectClient;
pub use mock_client::MockProviderClient;
pub use types::{StripeAccount, StripeAccountLink, StripeApiError, StripeErrorEnvelope};
