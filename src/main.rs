//! Composition root.
//!
//! Loads and validates configuration, constructs the provider client and
//! store exactly once, wires the application services, and serves the
//! Axum router. Every dependency is built here and shared read-only;
//! nothing is lazily initialized behind a global.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use paysync::adapters::http::accounts::{api_router, AccountAppState};
use paysync::adapters::store::PostgresAccountStore;
use paysync::adapters::stripe::StripeConnectClient;
use paysync::application::{AccountLifecycle, ApplyWebhookHandler, StatusQueryService};
use paysync::config::AppConfig;
use paysync::domain::account::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    if config.provider.is_live_mode() && !config.is_production() {
        tracing::warn!("live provider credentials outside production");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let provider = Arc::new(StripeConnectClient::new(&config.provider)?);
    let store = Arc::new(PostgresAccountStore::new(pool));

    let lifecycle = Arc::new(AccountLifecycle::new(
        provider,
        store,
        config.provider.onboarding_return_url.clone(),
        config.provider.onboarding_refresh_url.clone(),
    ));
    let state = AccountAppState {
        status_query: Arc::new(StatusQueryService::new(lifecycle.clone())),
        webhooks: Arc::new(ApplyWebhookHandler::new(
            WebhookVerifier::new(config.provider.webhook_secret.clone()),
            lifecycle.clone(),
        )),
        lifecycle,
    };

    let app = axum::Router::new()
        .nest("/api", api_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        );

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
