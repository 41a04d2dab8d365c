//! Redeem account-link code action

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::common::UserId;
use crate::domains::verification::errors::LedgerError;
use crate::domains::verification::generator::CODE_LEN;
use crate::domains::verification::models::CodePurpose;
use crate::kernel::ServerDeps;

/// Result of redeeming an account-link code
pub enum RedeemLinkResult {
    /// The code was live and is now bound to the redeeming user. The caller
    /// persists the channel-to-account link.
    Linked {
        channel_id: String,
        channel_handle: String,
    },
    /// Unknown, expired, or already-used code.
    Invalid,
}

/// Redeem an account-link code on behalf of a logged-in user.
///
/// On success the code is consumed and `redeeming_user` is recorded on it in
/// the same atomic step, so a concurrent attempt with a different account
/// cannot also claim the channel.
pub async fn redeem_link_code(
    code_value: &str,
    redeeming_user: UserId,
    deps: &ServerDeps,
) -> Result<RedeemLinkResult> {
    // Cheap format gate before touching storage.
    if !is_well_formed(code_value) {
        info!("Account-link code rejected on format");
        return Ok(RedeemLinkResult::Invalid);
    }

    match deps
        .ledger
        .redeem(CodePurpose::AccountLink, code_value, Some(redeeming_user))
        .await
    {
        Ok(code) => {
            let channel_id = code
                .channel_id
                .context("account-link code stored without a channel")?;
            let channel_handle = code.channel_handle.unwrap_or_default();
            info!(
                "Linked channel {} to account {}",
                channel_id, redeeming_user
            );
            Ok(RedeemLinkResult::Linked {
                channel_id,
                channel_handle,
            })
        }
        Err(
            e @ (LedgerError::NotFound | LedgerError::Expired | LedgerError::AlreadyConsumed),
        ) => {
            info!("Account-link redemption refused: {}", e);
            Ok(RedeemLinkResult::Invalid)
        }
        Err(e) => {
            error!("Account-link redemption failed: {}", e);
            Err(e.into())
        }
    }
}

/// Exactly six ASCII alphanumerics (codes are issued uppercase).
fn is_well_formed(value: &str) -> bool {
    value.len() == CODE_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}
