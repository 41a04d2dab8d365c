//! Issue account-link code action

use anyhow::Result;
use tracing::{error, info};

use crate::domains::verification::ledger::IssueContext;
use crate::domains::verification::models::VerificationCode;
use crate::kernel::ServerDeps;

/// Issue an account-link code for an external chat channel.
///
/// Called when a chat-bot user asks to link their channel to a platform
/// account. The caller transmits the returned code through the messaging
/// channel; the code stays unbound to any account until someone redeems it
/// from a logged-in session.
pub async fn issue_link_code(
    channel_id: String,
    channel_handle: String,
    deps: &ServerDeps,
) -> Result<VerificationCode> {
    let code = deps
        .ledger
        .issue(
            IssueContext::AccountLink {
                channel_id: channel_id.clone(),
                channel_handle,
            },
            deps.link_code_ttl,
        )
        .await
        .map_err(|e| {
            error!("Failed to issue account-link code: {}", e);
            anyhow::anyhow!("Failed to issue account-link code: {}", e)
        })?;

    info!(
        "Issued account-link code for channel {} (expires {})",
        channel_id, code.expires_at
    );
    Ok(code)
}
