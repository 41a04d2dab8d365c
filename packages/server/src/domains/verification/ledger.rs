//! Purpose-agnostic issuance and redemption of single-use codes.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::common::{CodeId, UserId};
use crate::kernel::BaseCodeStore;

use super::errors::LedgerError;
use super::generator::generate_code;
use super::models::{CodePurpose, InsertOutcome, VerificationCode};

/// How many fresh values issuance tries before surfacing `Conflict`.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Issue-time identity a code is bound to.
///
/// Carrying the metadata inside the purpose variant makes a purpose/metadata
/// mismatch unrepresentable.
#[derive(Debug, Clone)]
pub enum IssueContext {
    /// Email verification: the pending account being verified.
    EmailVerification { subject_id: UserId },
    /// Account linking: the external chat channel the code was requested for.
    AccountLink {
        channel_id: String,
        channel_handle: String,
    },
}

impl IssueContext {
    pub fn purpose(&self) -> CodePurpose {
        match self {
            IssueContext::EmailVerification { .. } => CodePurpose::EmailVerification,
            IssueContext::AccountLink { .. } => CodePurpose::AccountLink,
        }
    }
}

/// TokenLedger - issues and redeems single-use, time-bounded codes.
///
/// The ledger is purpose-agnostic: what a code unlocks is the caller's
/// concern; storage, uniqueness, expiry and single-use semantics live here.
/// Every atomic step is delegated to the store, so any number of ledger
/// instances may share one database without in-process locks.
#[derive(Clone)]
pub struct TokenLedger {
    store: Arc<dyn BaseCodeStore>,
}

impl TokenLedger {
    pub fn new(store: Arc<dyn BaseCodeStore>) -> Self {
        Self { store }
    }

    /// Issue a fresh code valid for `ttl` from now.
    ///
    /// Generation retries when the value collides with a live code of the
    /// same purpose; after `MAX_CODE_ATTEMPTS` misses it gives up with
    /// [`LedgerError::Conflict`].
    pub async fn issue(
        &self,
        ctx: IssueContext,
        ttl: Duration,
    ) -> Result<VerificationCode, LedgerError> {
        self.issue_at(ctx, ttl, Utc::now()).await
    }

    /// Timestamp-injectable variant of [`issue`](Self::issue).
    pub async fn issue_at(
        &self,
        ctx: IssueContext,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<VerificationCode, LedgerError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let record = build_record(&ctx, generate_code(ctx.purpose()), now, now + ttl);
            match self.store.insert(&record).await? {
                InsertOutcome::Inserted => return Ok(record),
                InsertOutcome::DuplicateCode => {
                    warn!(
                        "Code value collision for {} (attempt {}/{})",
                        ctx.purpose(),
                        attempt,
                        MAX_CODE_ATTEMPTS
                    );
                }
            }
        }
        Err(LedgerError::Conflict(MAX_CODE_ATTEMPTS))
    }

    /// Read-only lookup. Never mutates - safe for format/existence checks
    /// ahead of an actual redemption.
    pub async fn peek(
        &self,
        purpose: CodePurpose,
        value: &str,
    ) -> Result<Option<VerificationCode>, LedgerError> {
        Ok(self.store.find(purpose, value).await?)
    }

    /// Redeem a code: verify it is live and consume it, in one atomic step.
    ///
    /// The store performs the compare-and-set on `consumed`; under concurrent
    /// attempts on the same code exactly one caller gets the record back and
    /// the rest see [`LedgerError::AlreadyConsumed`].
    ///
    /// `redeemer` is recorded as `bound_user_id` (account-link flows); email
    /// verification passes `None`.
    pub async fn redeem(
        &self,
        purpose: CodePurpose,
        value: &str,
        redeemer: Option<UserId>,
    ) -> Result<VerificationCode, LedgerError> {
        self.redeem_at(purpose, value, redeemer, Utc::now()).await
    }

    /// Timestamp-injectable variant of [`redeem`](Self::redeem).
    pub async fn redeem_at(
        &self,
        purpose: CodePurpose,
        value: &str,
        redeemer: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<VerificationCode, LedgerError> {
        if let Some(code) = self.store.consume(purpose, value, redeemer, now).await? {
            return Ok(code);
        }

        // The CAS missed; re-read to say why. Nothing ever un-consumes a
        // code, so this classification cannot go stale in the gap.
        match self.store.find(purpose, value).await? {
            None => Err(LedgerError::NotFound),
            Some(code) if code.consumed => Err(LedgerError::AlreadyConsumed),
            Some(_) => Err(LedgerError::Expired),
        }
    }

    /// Purge codes whose expiry is more than `grace` in the past.
    ///
    /// Not required for correctness - expiry is enforced at redemption - but
    /// it bounds storage growth. The grace window keeps recently dead codes
    /// around so a redemption racing the sweep still reports `Expired`
    /// rather than `NotFound`.
    pub async fn sweep_expired(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<u64, LedgerError> {
        Ok(self.store.purge_expired(now - grace).await?)
    }
}

fn build_record(
    ctx: &IssueContext,
    value: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> VerificationCode {
    match ctx {
        IssueContext::EmailVerification { subject_id } => VerificationCode {
            id: CodeId::new(),
            purpose: CodePurpose::EmailVerification,
            code: value,
            subject_id: Some(*subject_id),
            channel_id: None,
            channel_handle: None,
            bound_user_id: None,
            consumed: false,
            issued_at,
            expires_at,
        },
        IssueContext::AccountLink {
            channel_id,
            channel_handle,
        } => VerificationCode {
            id: CodeId::new(),
            purpose: CodePurpose::AccountLink,
            code: value,
            subject_id: None,
            channel_id: Some(channel_id.clone()),
            channel_handle: Some(channel_handle.clone()),
            bound_user_id: None,
            consumed: false,
            issued_at,
            expires_at,
        },
    }
}
