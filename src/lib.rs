//! Paysync - Payment Account Onboarding & Webhook Reconciliation
//!
//! Keeps a locally-held record of each user's external payment-provider
//! account synchronized with the provider's authoritative state, across a
//! synchronous create/refresh path and an asynchronous signed-webhook path.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
