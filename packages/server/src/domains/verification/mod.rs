//! Verification domain - single-use codes for email verification and chat
//! account linking.
//!
//! Responsibilities:
//! - Purpose-agnostic code issuance, redemption, and expiry (TokenLedger)
//! - Code value generation (numeric vs. alphanumeric per purpose)
//! - Boundary flows that collapse internal failures into client-safe outcomes

pub mod actions;
pub mod errors;
pub mod generator;
pub mod ledger;
pub mod models;

pub use errors::LedgerError;
pub use ledger::{IssueContext, TokenLedger};
