use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CodeId, UserId};

/// Purpose a verification code was issued for.
///
/// Governs the code's character set and, by calling convention, its TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CodePurpose {
    EmailVerification,
    AccountLink,
}

impl std::fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodePurpose::EmailVerification => write!(f, "email_verification"),
            CodePurpose::AccountLink => write!(f, "account_link"),
        }
    }
}

impl std::str::FromStr for CodePurpose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "email_verification" => Ok(CodePurpose::EmailVerification),
            "account_link" => Ok(CodePurpose::AccountLink),
            _ => Err(anyhow::anyhow!("Invalid code purpose: {}", s)),
        }
    }
}

/// VerificationCode - a single-use, time-bounded code
///
/// For `EmailVerification` the code is bound to `subject_id` (the pending
/// account) at issue time. For `AccountLink` the issue-time identity is the
/// external chat channel (`channel_id`/`channel_handle`), and `bound_user_id`
/// is populated by the redeeming caller.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationCode {
    pub id: CodeId,
    pub purpose: CodePurpose,
    pub code: String,
    pub subject_id: Option<UserId>,
    pub channel_id: Option<String>,
    pub channel_handle: Option<String>,
    pub bound_user_id: Option<UserId>,
    pub consumed: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Result of attempting to persist a freshly issued code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An unconsumed code with the same purpose and value already exists.
    DuplicateCode,
}

impl VerificationCode {
    /// Whether this code could still be redeemed as of `now`.
    pub fn live(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && now <= self.expires_at
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl VerificationCode {
    /// Insert a freshly issued code.
    ///
    /// The partial unique index over live `(purpose, code)` pairs turns a
    /// value collision into `InsertOutcome::DuplicateCode`; the ledger owns
    /// the retry loop.
    pub async fn insert(&self, pool: &PgPool) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO verification_codes
                (id, purpose, code, subject_id, channel_id, channel_handle,
                 bound_user_id, consumed, issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(self.id)
        .bind(self.purpose)
        .bind(&self.code)
        .bind(self.subject_id)
        .bind(&self.channel_id)
        .bind(&self.channel_handle)
        .bind(self.bound_user_id)
        .bind(self.consumed)
        .bind(self.issued_at)
        .bind(self.expires_at)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateCode)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find a code by purpose and value.
    ///
    /// When a consumed historical row shares a value with a live one, the
    /// live row wins; ties go to the most recently issued.
    pub async fn find(purpose: CodePurpose, code: &str, pool: &PgPool) -> Result<Option<Self>> {
        let found = sqlx::query_as::<_, VerificationCode>(
            r#"
            SELECT * FROM verification_codes
            WHERE purpose = $1 AND code = $2
            ORDER BY consumed ASC, issued_at DESC
            LIMIT 1
            "#,
        )
        .bind(purpose)
        .bind(code)
        .fetch_optional(pool)
        .await?;
        Ok(found)
    }

    /// Atomically consume a live code (compare-and-set on `consumed`).
    ///
    /// A single conditional UPDATE, never read-then-write: under concurrent
    /// redemption attempts the database hands the row to exactly one caller.
    /// Returns `None` when the code is absent, already consumed, or past
    /// `expires_at` as of `now`.
    pub async fn consume(
        purpose: CodePurpose,
        code: &str,
        bound_user_id: Option<UserId>,
        now: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let consumed = sqlx::query_as::<_, VerificationCode>(
            r#"
            UPDATE verification_codes
            SET consumed = TRUE,
                bound_user_id = COALESCE($3, bound_user_id)
            WHERE purpose = $1 AND code = $2 AND consumed = FALSE AND expires_at >= $4
            RETURNING *
            "#,
        )
        .bind(purpose)
        .bind(code)
        .bind(bound_user_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;
        Ok(consumed)
    }

    /// Delete codes whose expiry predates `cutoff`. Returns the purged count.
    pub async fn purge_expired(cutoff: DateTime<Utc>, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
