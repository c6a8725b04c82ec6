//! HTTP adapters (Axum).

pub mod accounts;
