use thiserror::Error;

/// Failure taxonomy for the verification-token ledger
///
/// The ledger never retries these on its own (issuance collisions excepted,
/// which are absorbed internally up to a bounded attempt count); callers
/// decide what to do, typically by prompting for a fresh code.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No code with this purpose and value exists.
    #[error("Verification code not found")]
    NotFound,

    /// The code exists but is past its TTL.
    #[error("Verification code has expired")]
    Expired,

    /// The code was already redeemed.
    #[error("Verification code already used")]
    AlreadyConsumed,

    /// Issuance could not find a free code value within the retry budget.
    #[error("Code generation collided {0} times; giving up")]
    Conflict(u32),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// Client-facing message.
    ///
    /// NotFound, Expired and AlreadyConsumed collapse into one message so the
    /// redemption endpoint cannot be used to probe which codes exist or have
    /// been used. Conflict and Storage are internal conditions.
    pub fn public_message(&self) -> &'static str {
        match self {
            LedgerError::NotFound | LedgerError::Expired | LedgerError::AlreadyConsumed => {
                "This code is invalid or has expired. Please request a new one."
            }
            LedgerError::Conflict(_) | LedgerError::Storage(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}
