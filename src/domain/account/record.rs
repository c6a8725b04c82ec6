//! Payment account record and eligibility status derivation.
//!
//! An `AccountRecord` is this service's local cache of one user's external
//! payment-provider account. The provider owns the authoritative state;
//! updates arrive both from signed webhooks and from synchronous refreshes,
//! in no guaranteed order. Two rules keep those channels convergent:
//!
//! - Status is a pure function of the capability snapshot, never stored
//!   independently, so replayed or reordered updates cannot produce a
//!   status the booleans do not imply.
//! - Every mutation replaces the full record from a complete
//!   `ProviderSnapshot`. There are no partial field patches.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Eligibility status of a payment account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// No account exists for this user.
    None,
    /// Account created, onboarding not yet complete.
    Pending,
    /// Charges and payouts are both enabled.
    Active,
    /// Details were submitted but the provider has charges or payouts
    /// disabled: compliance hold, or a flagged abandoned onboarding.
    Restricted,
}

impl AccountStatus {
    /// Derives the status implied by a capability snapshot.
    pub fn derive(charges_enabled: bool, payouts_enabled: bool, details_submitted: bool) -> Self {
        if charges_enabled && payouts_enabled {
            AccountStatus::Active
        } else if details_submitted {
            AccountStatus::Restricted
        } else {
            AccountStatus::Pending
        }
    }

    /// String form used for persistence and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::None => "none",
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Restricted => "restricted",
        }
    }
}

/// Complete point-in-time view of a provider account.
///
/// Both update channels carry this full field set, which is what makes
/// applying snapshots commutative under last-write-wins: a snapshot never
/// depends on the record it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub provider_account_id: String,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    pub email: Option<String>,
    pub country: String,
    pub default_currency: String,
}

/// Local record of a user's provider account, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub user_id: UserId,
    pub provider_account_id: String,
    pub email: Option<String>,
    pub country: String,
    pub default_currency: String,
    pub status: AccountStatus,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub details_submitted: bool,
    /// Provider-hosted onboarding URL. Short-lived; cleared once
    /// onboarding completes.
    pub onboarding_url: Option<String>,
    pub updated_at: Timestamp,
}

impl AccountRecord {
    /// Builds the complete record implied by a snapshot.
    ///
    /// Used both when registering a fresh account (freshly created provider
    /// accounts have every capability disabled, so the result is `Pending`)
    /// and as the body of `apply_snapshot`.
    pub fn from_snapshot(
        user_id: UserId,
        snapshot: &ProviderSnapshot,
        onboarding_url: Option<String>,
        now: Timestamp,
    ) -> Self {
        let status = AccountStatus::derive(
            snapshot.charges_enabled,
            snapshot.payouts_enabled,
            snapshot.details_submitted,
        );
        let onboarding_url = if status == AccountStatus::Active {
            None
        } else {
            onboarding_url
        };

        Self {
            user_id,
            provider_account_id: snapshot.provider_account_id.clone(),
            email: snapshot.email.clone(),
            country: snapshot.country.clone(),
            default_currency: snapshot.default_currency.clone(),
            status,
            charges_enabled: snapshot.charges_enabled,
            payouts_enabled: snapshot.payouts_enabled,
            details_submitted: snapshot.details_submitted,
            onboarding_url,
            updated_at: now,
        }
    }

    /// Returns the full replacement record for this snapshot.
    ///
    /// The only mutation primitive. Idempotent: applying the same snapshot
    /// twice leaves every observable field unchanged (`updated_at` moves,
    /// recording write recency for last-write-wins).
    pub fn apply_snapshot(&self, snapshot: &ProviderSnapshot, now: Timestamp) -> Self {
        Self::from_snapshot(
            self.user_id.clone(),
            snapshot,
            self.onboarding_url.clone(),
            now,
        )
    }

    /// Derived completion flag: the user can both charge and receive payouts.
    pub fn onboarding_completed(&self) -> bool {
        self.charges_enabled && self.payouts_enabled
    }
}
