//! Integration tests for the verification-token ledger.
//!
//! All critical code paths:
//! - Issue / peek / redeem round trips
//! - Single-use enforcement, including under concurrency
//! - Expiry semantics at the TTL boundary
//! - Collision retry and exhaustion
//! - Boundary flows collapsing failures into client-safe outcomes

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;

use server_core::common::UserId;
use server_core::domains::verification::actions::{
    issue_email_code, issue_link_code, redeem_email_code, redeem_link_code, RedeemEmailResult,
    RedeemLinkResult,
};
use server_core::domains::verification::models::{CodePurpose, InsertOutcome, VerificationCode};
use server_core::domains::verification::{IssueContext, LedgerError, TokenLedger};
use server_core::kernel::{BaseCodeStore, MemoryCodeStore, ServerDeps};

// ============================================================================
// Test Helpers
// ============================================================================

fn ledger() -> (TokenLedger, Arc<MemoryCodeStore>) {
    let store = Arc::new(MemoryCodeStore::new());
    (TokenLedger::new(store.clone()), store)
}

fn email_ctx() -> (IssueContext, UserId) {
    let subject_id = UserId::new();
    (IssueContext::EmailVerification { subject_id }, subject_id)
}

/// Store whose inserts always collide, for exercising retry exhaustion.
struct AlwaysCollidingStore;

#[async_trait]
impl BaseCodeStore for AlwaysCollidingStore {
    async fn insert(&self, _code: &VerificationCode) -> Result<InsertOutcome> {
        Ok(InsertOutcome::DuplicateCode)
    }

    async fn find(&self, _purpose: CodePurpose, _code: &str) -> Result<Option<VerificationCode>> {
        Ok(None)
    }

    async fn consume(
        &self,
        _purpose: CodePurpose,
        _code: &str,
        _bound_user_id: Option<UserId>,
        _now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>> {
        Ok(None)
    }

    async fn purge_expired(&self, _cutoff: DateTime<Utc>) -> Result<u64> {
        Ok(0)
    }
}

// ============================================================================
// Issue / peek / redeem round trips
// ============================================================================

#[tokio::test]
async fn issue_then_peek_then_redeem_roundtrip() {
    let (ledger, _store) = ledger();
    let (ctx, subject_id) = email_ctx();

    let issued = ledger.issue(ctx, Duration::minutes(30)).await.unwrap();
    assert_eq!(issued.purpose, CodePurpose::EmailVerification);
    assert_eq!(issued.subject_id, Some(subject_id));
    assert!(!issued.consumed);
    assert_eq!(issued.expires_at, issued.issued_at + Duration::minutes(30));

    // Peek does not consume.
    let peeked = ledger
        .peek(CodePurpose::EmailVerification, &issued.code)
        .await
        .unwrap()
        .expect("issued code should be visible");
    assert!(!peeked.consumed);

    let redeemed = ledger
        .redeem(CodePurpose::EmailVerification, &issued.code, None)
        .await
        .unwrap();
    assert!(redeemed.consumed);
    assert_eq!(redeemed.subject_id, Some(subject_id));

    // After redemption the code is still peekable, now consumed.
    let peeked = ledger
        .peek(CodePurpose::EmailVerification, &issued.code)
        .await
        .unwrap()
        .expect("redeemed code should still be visible");
    assert!(peeked.consumed);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let (ledger, _store) = ledger();

    let err = ledger
        .redeem(CodePurpose::EmailVerification, "000000", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound));

    assert!(ledger
        .peek(CodePurpose::EmailVerification, "000000")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn purposes_do_not_share_codes() {
    let (ledger, _store) = ledger();
    let (ctx, _) = email_ctx();
    let issued = ledger.issue(ctx, Duration::minutes(30)).await.unwrap();

    // The same value under the other purpose does not exist.
    let err = ledger
        .redeem(CodePurpose::AccountLink, &issued.code, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound));
}

// ============================================================================
// Single-use enforcement
// ============================================================================

#[tokio::test]
async fn second_redemption_is_already_consumed() {
    let (ledger, _store) = ledger();
    let (ctx, _) = email_ctx();
    let issued = ledger.issue(ctx, Duration::minutes(30)).await.unwrap();

    ledger
        .redeem(CodePurpose::EmailVerification, &issued.code, None)
        .await
        .unwrap();

    let err = ledger
        .redeem(CodePurpose::EmailVerification, &issued.code, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyConsumed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_redemptions_have_exactly_one_winner() {
    let (ledger, _store) = ledger();
    let (ctx, _) = email_ctx();
    let issued = ledger.issue(ctx, Duration::minutes(30)).await.unwrap();

    let attempts = 16;
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let ledger = ledger.clone();
            let value = issued.code.clone();
            tokio::spawn(async move {
                ledger
                    .redeem(CodePurpose::EmailVerification, &value, None)
                    .await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("redemption task panicked"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::AlreadyConsumed)))
        .count();

    assert_eq!(winners, 1, "exactly one concurrent redemption may succeed");
    assert_eq!(losers, attempts - 1);
}

// ============================================================================
// Expiry semantics
// ============================================================================

#[tokio::test]
async fn redemption_respects_the_ttl_boundary() {
    let (ledger, _store) = ledger();
    let t0 = Utc::now();
    let ttl = Duration::minutes(30);

    // Just inside the window: succeeds.
    let (ctx, _) = email_ctx();
    let issued = ledger.issue_at(ctx, ttl, t0).await.unwrap();
    let redeemed = ledger
        .redeem_at(
            CodePurpose::EmailVerification,
            &issued.code,
            None,
            t0 + Duration::minutes(29),
        )
        .await;
    assert!(redeemed.is_ok());

    // Just past the window: Expired, not NotFound.
    let (ctx, _) = email_ctx();
    let issued = ledger.issue_at(ctx, ttl, t0).await.unwrap();
    let err = ledger
        .redeem_at(
            CodePurpose::EmailVerification,
            &issued.code,
            None,
            t0 + ttl + Duration::seconds(1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Expired));
}

#[tokio::test]
async fn expired_code_fails_without_side_effects() {
    let (ledger, store) = ledger();
    let t0 = Utc::now();
    let (ctx, _) = email_ctx();
    let issued = ledger.issue_at(ctx, Duration::minutes(30), t0).await.unwrap();

    let late = t0 + Duration::minutes(31);
    let err = ledger
        .redeem_at(CodePurpose::EmailVerification, &issued.code, None, late)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Expired));

    // The row was not consumed by the failed attempt.
    let row = store.all().into_iter().find(|r| r.code == issued.code).unwrap();
    assert!(!row.consumed);
}

// ============================================================================
// Issuance uniqueness
// ============================================================================

#[tokio::test]
async fn reissue_for_same_subject_never_collides_with_live_code() {
    let (ledger, store) = ledger();
    let t0 = Utc::now();
    let subject_id = UserId::new();

    let first = ledger
        .issue_at(
            IssueContext::EmailVerification { subject_id },
            Duration::minutes(30),
            t0,
        )
        .await
        .unwrap();
    let second = ledger
        .issue_at(
            IssueContext::EmailVerification { subject_id },
            Duration::minutes(30),
            t0 + Duration::minutes(1),
        )
        .await
        .unwrap();

    // Both codes are live; the store's uniqueness rule guarantees distinct
    // values (a collision would have forced regeneration).
    assert_ne!(first.code, second.code);
    assert_eq!(store.live_count(t0 + Duration::minutes(1)), 2);

    // The older code still works: superseded means orphaned, not revoked.
    assert!(ledger
        .redeem_at(
            CodePurpose::EmailVerification,
            &first.code,
            None,
            t0 + Duration::minutes(2)
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn issuance_surfaces_conflict_after_retry_budget() {
    let ledger = TokenLedger::new(Arc::new(AlwaysCollidingStore));
    let (ctx, _) = email_ctx();

    let err = ledger.issue(ctx, Duration::minutes(30)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

// ============================================================================
// Maintenance sweep
// ============================================================================

#[tokio::test]
async fn sweep_purges_only_past_the_grace_window() {
    let (ledger, store) = ledger();
    let now = Utc::now();
    let grace = Duration::minutes(60);

    // Expired two hours ago: swept.
    let (ctx, _) = email_ctx();
    ledger
        .issue_at(ctx, Duration::minutes(30), now - Duration::minutes(150))
        .await
        .unwrap();
    // Expired ten minutes ago: inside the grace window, kept.
    let (ctx, _) = email_ctx();
    let recent = ledger
        .issue_at(ctx, Duration::minutes(30), now - Duration::minutes(40))
        .await
        .unwrap();
    // Live: kept.
    let (ctx, _) = email_ctx();
    let live = ledger
        .issue_at(ctx, Duration::minutes(30), now)
        .await
        .unwrap();

    let purged = ledger.sweep_expired(now, grace).await.unwrap();
    assert_eq!(purged, 1);

    let remaining: Vec<String> = store.all().into_iter().map(|r| r.code).collect();
    assert!(remaining.contains(&recent.code));
    assert!(remaining.contains(&live.code));

    // A redemption racing the sweep still distinguishes Expired from
    // NotFound for recently dead codes.
    let err = ledger
        .redeem_at(CodePurpose::EmailVerification, &recent.code, None, now)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Expired));
}

// ============================================================================
// Boundary flows
// ============================================================================

#[tokio::test]
async fn email_flow_verifies_account() {
    let (deps, _store) = ServerDeps::for_tests();
    let subject_id = UserId::new();

    let issued = issue_email_code(subject_id, &deps).await.unwrap();
    assert_eq!(issued.code.len(), 6);
    assert!(issued.code.bytes().all(|b| b.is_ascii_digit()));

    match redeem_email_code(&issued.code, &deps).await.unwrap() {
        RedeemEmailResult::Verified { subject_id: got } => assert_eq!(got, subject_id),
        RedeemEmailResult::Invalid => panic!("fresh code should verify"),
    }

    // Replays collapse to Invalid; the internal reason is not exposed.
    assert!(matches!(
        redeem_email_code(&issued.code, &deps).await.unwrap(),
        RedeemEmailResult::Invalid
    ));
}

#[tokio::test]
async fn email_flow_rejects_malformed_values_without_storage() {
    let (deps, store) = ServerDeps::for_tests();
    for bad in ["", "12345", "1234567", "12a456"] {
        assert!(matches!(
            redeem_email_code(bad, &deps).await.unwrap(),
            RedeemEmailResult::Invalid
        ));
    }
    assert!(store.all().is_empty());
}

#[tokio::test]
async fn link_flow_binds_redeeming_user() {
    let (deps, store) = ServerDeps::for_tests();
    let user = UserId::new();

    let issued = issue_link_code("chan-482".to_string(), "@resident".to_string(), &deps)
        .await
        .unwrap();
    assert_eq!(issued.code.len(), 6);
    assert!(issued.subject_id.is_none());
    assert_eq!(issued.channel_id.as_deref(), Some("chan-482"));

    match redeem_link_code(&issued.code, user, &deps).await.unwrap() {
        RedeemLinkResult::Linked {
            channel_id,
            channel_handle,
        } => {
            assert_eq!(channel_id, "chan-482");
            assert_eq!(channel_handle, "@resident");
        }
        RedeemLinkResult::Invalid => panic!("fresh code should link"),
    }

    // The binding happened in the same atomic step as consumption.
    let row = store.all().into_iter().find(|r| r.code == issued.code).unwrap();
    assert!(row.consumed);
    assert_eq!(row.bound_user_id, Some(user));

    // A second account cannot claim the same code.
    assert!(matches!(
        redeem_link_code(&issued.code, UserId::new(), &deps).await.unwrap(),
        RedeemLinkResult::Invalid
    ));
    let row = store.all().into_iter().find(|r| r.code == issued.code).unwrap();
    assert_eq!(row.bound_user_id, Some(user));
}
