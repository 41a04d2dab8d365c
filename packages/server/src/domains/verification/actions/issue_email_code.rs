//! Issue email-verification code action

use anyhow::Result;
use tracing::{error, info};

use crate::common::UserId;
use crate::domains::verification::ledger::IssueContext;
use crate::domains::verification::models::VerificationCode;
use crate::kernel::ServerDeps;

/// Issue a 6-digit email-verification code for a pending account.
///
/// Called by the registration flow. The caller transmits the returned code
/// (by email) and holds the expiry instant for its messaging; this flow only
/// mints the code. A later request for the same account simply issues a new
/// code - the older one is left to expire and is never revalidated.
pub async fn issue_email_code(subject_id: UserId, deps: &ServerDeps) -> Result<VerificationCode> {
    let code = deps
        .ledger
        .issue(
            IssueContext::EmailVerification { subject_id },
            deps.email_code_ttl,
        )
        .await
        .map_err(|e| {
            error!("Failed to issue email-verification code: {}", e);
            anyhow::anyhow!("Failed to issue email-verification code: {}", e)
        })?;

    info!(
        "Issued email-verification code for account {} (expires {})",
        subject_id, code.expires_at
    );
    Ok(code)
}
