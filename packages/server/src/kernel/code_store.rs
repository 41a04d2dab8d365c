//! Postgres-backed verification-code store.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::UserId;
use crate::domains::verification::models::{CodePurpose, InsertOutcome, VerificationCode};

use super::traits::BaseCodeStore;

/// `BaseCodeStore` backed by the application database.
///
/// All SQL lives on the `VerificationCode` model; this adapter only carries
/// the pool. The atomicity guarantees come from the partial unique index on
/// live `(purpose, code)` pairs and the conditional-UPDATE consume.
#[derive(Clone)]
pub struct PgCodeStore {
    pool: PgPool,
}

impl PgCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseCodeStore for PgCodeStore {
    async fn insert(&self, code: &VerificationCode) -> Result<InsertOutcome> {
        code.insert(&self.pool).await
    }

    async fn find(&self, purpose: CodePurpose, code: &str) -> Result<Option<VerificationCode>> {
        VerificationCode::find(purpose, code, &self.pool).await
    }

    async fn consume(
        &self,
        purpose: CodePurpose,
        code: &str,
        bound_user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>> {
        VerificationCode::consume(purpose, code, bound_user_id, now, &self.pool).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        VerificationCode::purge_expired(cutoff, &self.pool).await
    }
}
