//! HTTP surface for account onboarding, status, and webhooks.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AccountStatusResponse, CreateAccountBody, CreateAccountResponse, ErrorResponse, StatusParams,
    WebhookAck,
};
pub use handlers::{AccountAppState, AuthenticatedUser};
pub use routes::{account_routes, api_router, webhook_routes};
