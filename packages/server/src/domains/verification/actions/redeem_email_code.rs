//! Redeem email-verification code action

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::common::UserId;
use crate::domains::verification::errors::LedgerError;
use crate::domains::verification::generator::CODE_LEN;
use crate::domains::verification::models::CodePurpose;
use crate::kernel::ServerDeps;

/// Result of redeeming an email-verification code
pub enum RedeemEmailResult {
    /// The code was live. The caller activates the account and starts a
    /// session.
    Verified { subject_id: UserId },
    /// Unknown, expired, or already-used code. Which of the three it was is
    /// logged but deliberately not returned.
    Invalid,
}

/// Redeem an email-verification code.
///
/// At most one redemption ever succeeds per code; a repeat attempt or an
/// attempt after expiry comes back `Invalid` with no side effects.
pub async fn redeem_email_code(code_value: &str, deps: &ServerDeps) -> Result<RedeemEmailResult> {
    // Cheap format gate before touching storage.
    if !is_well_formed(code_value) {
        info!("Email-verification code rejected on format");
        return Ok(RedeemEmailResult::Invalid);
    }

    match deps
        .ledger
        .redeem(CodePurpose::EmailVerification, code_value, None)
        .await
    {
        Ok(code) => {
            let subject_id = code
                .subject_id
                .context("email-verification code stored without a subject")?;
            info!("Email verified for account {}", subject_id);
            Ok(RedeemEmailResult::Verified { subject_id })
        }
        Err(
            e @ (LedgerError::NotFound | LedgerError::Expired | LedgerError::AlreadyConsumed),
        ) => {
            info!("Email-verification redemption refused: {}", e);
            Ok(RedeemEmailResult::Invalid)
        }
        Err(e) => {
            error!("Email-verification redemption failed: {}", e);
            Err(e.into())
        }
    }
}

/// Exactly six ASCII digits.
fn is_well_formed(value: &str) -> bool {
    value.len() == CODE_LEN && value.bytes().all(|b| b.is_ascii_digit())
}
