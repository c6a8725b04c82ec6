//! Application layer - orchestration over the domain and ports.
//!
//! The account lifecycle is the sole mutator of the account store; the
//! webhook handler and status query service route into it.

mod apply_webhook;
mod lifecycle;
mod status_query;

pub use apply_webhook::{ApplyWebhookHandler, WebhookOutcome};
pub use lifecycle::{
    AccountError, AccountLifecycle, CreateAccountCommand, CreateAccountResult, SnapshotOutcome,
};
pub use status_query::{AccountStatusView, StatusQueryService};
