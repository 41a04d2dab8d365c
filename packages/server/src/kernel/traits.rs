// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Business rules
// (what a code unlocks, who may see a report) live in domain code that uses
// these traits.
//
// Naming convention: Base* for trait names (e.g., BaseCodeStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::UserId;
use crate::domains::verification::models::{CodePurpose, InsertOutcome, VerificationCode};

// =============================================================================
// Code Store Trait (Infrastructure - verification-code persistence)
// =============================================================================

/// Persistence for verification codes.
///
/// The code store is the only shared mutable resource of the verification
/// subsystem, and horizontally scaled ledger instances coordinate through it
/// alone. Implementations must therefore provide two atomicity guarantees:
///
/// - `insert` enforces uniqueness of `(purpose, code)` among unconsumed rows
///   and reports a collision as `InsertOutcome::DuplicateCode`;
/// - `consume` flips `consumed` false -> true in a single atomic step, so at
///   most one concurrent caller gets the row back.
#[async_trait]
pub trait BaseCodeStore: Send + Sync {
    /// Persist a freshly issued code.
    async fn insert(&self, code: &VerificationCode) -> Result<InsertOutcome>;

    /// Read-only lookup. Prefers the live row when an old consumed row
    /// shares the value.
    async fn find(&self, purpose: CodePurpose, code: &str) -> Result<Option<VerificationCode>>;

    /// Atomic compare-and-set redemption.
    ///
    /// Returns the consumed row when this caller won the flip; `None` when
    /// the code is absent, already consumed, or past `expires_at` as of
    /// `now`. `bound_user_id`, when given, is recorded in the same step.
    async fn consume(
        &self,
        purpose: CodePurpose,
        code: &str,
        bound_user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>>;

    /// Delete rows whose `expires_at` predates `cutoff`. Returns the count.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
