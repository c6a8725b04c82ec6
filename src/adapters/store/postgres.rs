//! PostgreSQL implementation of the account store.
//!
//! Persists one row per user in `payment_accounts` with a unique index on
//! the provider account id. The upsert is a single
//! `INSERT ... ON CONFLICT (user_id) DO UPDATE` statement, which is the
//! per-key atomic conditional write the concurrency model requires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::account::{AccountRecord, AccountStatus};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{AccountStore, StoreError};

/// PostgreSQL account store.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an account record.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    user_id: String,
    provider_account_id: String,
    email: Option<String>,
    country: String,
    default_currency: String,
    status: String,
    charges_enabled: bool,
    payouts_enabled: bool,
    details_submitted: bool,
    onboarding_url: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for AccountRecord {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(AccountRecord {
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::Backend(format!("invalid user_id column: {e}")))?,
            provider_account_id: row.provider_account_id,
            email: row.email,
            country: row.country,
            default_currency: row.default_currency,
            status: parse_status(&row.status)?,
            charges_enabled: row.charges_enabled,
            payouts_enabled: row.payouts_enabled,
            details_submitted: row.details_submitted,
            onboarding_url: row.onboarding_url,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<AccountStatus, StoreError> {
    match s {
        "pending" => Ok(AccountStatus::Pending),
        "active" => Ok(AccountStatus::Active),
        "restricted" => Ok(AccountStatus::Restricted),
        "none" => Ok(AccountStatus::None),
        other => Err(StoreError::Backend(format!(
            "unknown status column value: {other}"
        ))),
    }
}

fn map_sqlx_error(err: sqlx::Error, provider_account_id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::ProviderIdConflict(provider_account_id.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<AccountRecord>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT user_id, provider_account_id, email, country, default_currency,
                   status, charges_enabled, payouts_enabled, details_submitted,
                   onboarding_url, updated_at
            FROM payment_accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(AccountRecord::try_from).transpose()
    }

    async fn get_by_provider_id(
        &self,
        provider_account_id: &str,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT user_id, provider_account_id, email, country, default_currency,
                   status, charges_enabled, payouts_enabled, details_submitted,
                   onboarding_url, updated_at
            FROM payment_accounts
            WHERE provider_account_id = $1
            "#,
        )
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(AccountRecord::try_from).transpose()
    }

    async fn upsert(&self, record: AccountRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO payment_accounts (
                user_id, provider_account_id, email, country, default_currency,
                status, charges_enabled, payouts_enabled, details_submitted,
                onboarding_url, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id) DO UPDATE SET
                provider_account_id = EXCLUDED.provider_account_id,
                email = EXCLUDED.email,
                country = EXCLUDED.country,
                default_currency = EXCLUDED.default_currency,
                status = EXCLUDED.status,
                charges_enabled = EXCLUDED.charges_enabled,
                payouts_enabled = EXCLUDED.payouts_enabled,
                details_submitted = EXCLUDED.details_submitted,
                onboarding_url = EXCLUDED.onboarding_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(&record.provider_account_id)
        .bind(&record.email)
        .bind(&record.country)
        .bind(&record.default_currency)
        .bind(record.status.as_str())
        .bind(record.charges_enabled)
        .bind(record.payouts_enabled)
        .bind(record.details_submitted)
        .bind(&record.onboarding_url)
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &record.provider_account_id))?;

        Ok(())
    }
}
