//! Server dependencies for domain flows (using traits for testability)
//!
//! The central dependency container handed to every boundary flow. Storage
//! sits behind the `BaseCodeStore` trait so tests run against the in-memory
//! double and production against Postgres, with no change to domain code.

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::config::Config;
use crate::domains::verification::TokenLedger;

use super::code_store::PgCodeStore;
use super::traits::BaseCodeStore;

/// Server dependencies accessible to domain flows
#[derive(Clone)]
pub struct ServerDeps {
    /// Verification-token ledger over the configured store.
    pub ledger: TokenLedger,
    /// Lifetime of email-verification codes.
    pub email_code_ttl: Duration,
    /// Lifetime of account-link codes.
    pub link_code_ttl: Duration,
    /// How long past expiry the sweep keeps dead codes around.
    pub code_sweep_grace: Duration,
}

impl ServerDeps {
    /// Production wiring: Postgres-backed store, TTLs from configuration.
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self::with_store(Arc::new(PgCodeStore::new(pool)), config)
    }

    /// Wiring over an arbitrary store (alternative backends, harnesses).
    pub fn with_store(store: Arc<dyn BaseCodeStore>, config: &Config) -> Self {
        Self {
            ledger: TokenLedger::new(store),
            email_code_ttl: Duration::minutes(config.email_code_ttl_minutes),
            link_code_ttl: Duration::minutes(config.link_code_ttl_minutes),
            code_sweep_grace: Duration::minutes(config.code_sweep_grace_minutes),
        }
    }
}
