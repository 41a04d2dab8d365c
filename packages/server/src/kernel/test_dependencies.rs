// Test dependencies - in-memory implementations for testing
//
// Provides a code store that mirrors the production store's atomicity
// guarantees with a single mutex, so ledger behavior (single-use redemption,
// collision handling, expiry) can be exercised without a database.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::common::UserId;
use crate::domains::verification::models::{CodePurpose, InsertOutcome, VerificationCode};
use crate::domains::verification::TokenLedger;

use super::deps::ServerDeps;
use super::traits::BaseCodeStore;

// =============================================================================
// In-memory code store
// =============================================================================

/// In-memory `BaseCodeStore`.
///
/// One mutex guards the whole table: every operation is a single critical
/// section, which is exactly the linearizability the Postgres store gets from
/// its conditional UPDATE and partial unique index.
#[derive(Default)]
pub struct MemoryCodeStore {
    rows: Mutex<Vec<VerificationCode>>,
}

impl MemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all rows, for assertions.
    pub fn all(&self) -> Vec<VerificationCode> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of rows still redeemable as of `now`.
    pub fn live_count(&self, now: DateTime<Utc>) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.live(now))
            .count()
    }
}

#[async_trait]
impl BaseCodeStore for MemoryCodeStore {
    async fn insert(&self, code: &VerificationCode) -> Result<InsertOutcome> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows
            .iter()
            .any(|row| row.purpose == code.purpose && row.code == code.code && !row.consumed);
        if duplicate {
            return Ok(InsertOutcome::DuplicateCode);
        }
        rows.push(code.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find(&self, purpose: CodePurpose, code: &str) -> Result<Option<VerificationCode>> {
        let rows = self.rows.lock().unwrap();
        let mut matches: Vec<&VerificationCode> = rows
            .iter()
            .filter(|row| row.purpose == purpose && row.code == code)
            .collect();
        // Prefer the live row when an old consumed row shares the value.
        matches.sort_by_key(|row| (row.consumed, std::cmp::Reverse(row.issued_at)));
        Ok(matches.first().map(|row| (*row).clone()))
    }

    async fn consume(
        &self,
        purpose: CodePurpose,
        code: &str,
        bound_user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.purpose == purpose && row.code == code && !row.consumed && now <= row.expires_at
            {
                row.consumed = true;
                if bound_user_id.is_some() {
                    row.bound_user_id = bound_user_id;
                }
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.expires_at >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

// =============================================================================
// Test wiring
// =============================================================================

impl ServerDeps {
    /// Deps over a fresh in-memory store, with the production default TTLs.
    ///
    /// Returns the store too so tests can assert on raw rows.
    pub fn for_tests() -> (Self, Arc<MemoryCodeStore>) {
        let store = Arc::new(MemoryCodeStore::new());
        let deps = Self {
            ledger: TokenLedger::new(store.clone()),
            email_code_ttl: Duration::minutes(30),
            link_code_ttl: Duration::minutes(15),
            code_sweep_grace: Duration::minutes(60),
        };
        (deps, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CodeId;

    fn code(purpose: CodePurpose, value: &str, expires_in: Duration) -> VerificationCode {
        let now = Utc::now();
        VerificationCode {
            id: CodeId::new(),
            purpose,
            code: value.to_string(),
            subject_id: Some(UserId::new()),
            channel_id: None,
            channel_handle: None,
            bound_user_id: None,
            consumed: false,
            issued_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn test_insert_reports_live_duplicates() {
        let store = MemoryCodeStore::new();
        let first = code(CodePurpose::EmailVerification, "111111", Duration::minutes(30));
        assert_eq!(store.insert(&first).await.unwrap(), InsertOutcome::Inserted);

        let clash = code(CodePurpose::EmailVerification, "111111", Duration::minutes(30));
        assert_eq!(
            store.insert(&clash).await.unwrap(),
            InsertOutcome::DuplicateCode
        );

        // Same value under a different purpose is not a collision.
        let other_purpose = code(CodePurpose::AccountLink, "111111", Duration::minutes(15));
        assert_eq!(
            store.insert(&other_purpose).await.unwrap(),
            InsertOutcome::Inserted
        );
    }

    #[tokio::test]
    async fn test_consume_is_single_shot() {
        let store = MemoryCodeStore::new();
        let now = Utc::now();
        let row = code(CodePurpose::EmailVerification, "222222", Duration::minutes(30));
        store.insert(&row).await.unwrap();

        let first = store
            .consume(CodePurpose::EmailVerification, "222222", None, now)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .consume(CodePurpose::EmailVerification, "222222", None, now)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_consume_respects_expiry_instant() {
        let store = MemoryCodeStore::new();
        let row = code(CodePurpose::EmailVerification, "333333", Duration::minutes(30));
        let expires_at = row.expires_at;
        store.insert(&row).await.unwrap();

        // One second past expiry: dead.
        let late = store
            .consume(
                CodePurpose::EmailVerification,
                "333333",
                None,
                expires_at + Duration::seconds(1),
            )
            .await
            .unwrap();
        assert!(late.is_none());

        // At the boundary: still redeemable.
        let on_time = store
            .consume(CodePurpose::EmailVerification, "333333", None, expires_at)
            .await
            .unwrap();
        assert!(on_time.is_some());
    }

    #[tokio::test]
    async fn test_purge_only_removes_past_cutoff() {
        let store = MemoryCodeStore::new();
        let now = Utc::now();
        store
            .insert(&code(CodePurpose::EmailVerification, "444444", Duration::minutes(-90)))
            .await
            .unwrap();
        store
            .insert(&code(CodePurpose::EmailVerification, "555555", Duration::minutes(30)))
            .await
            .unwrap();

        let purged = store.purge_expired(now - Duration::minutes(60)).await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].code, "555555");
    }
}
