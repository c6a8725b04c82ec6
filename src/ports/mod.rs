//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application core and the outside world. Adapters implement them.
//!
//! - `ProviderClient` - capability surface over the external payment API
//! - `AccountStore` - durable keyed storage for account records

mod account_store;
mod provider_client;

pub use account_store::{AccountStore, StoreError};
pub use provider_client::{
    CreateAccountRequest, OnboardingLink, ProviderAccount, ProviderClient, ProviderError,
};
