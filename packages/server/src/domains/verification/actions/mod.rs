//! Verification boundary flows
//!
//! Thin async functions over `ServerDeps`, one file per flow. Each collapses
//! the ledger's failure taxonomy into the outcome its caller may act on.

pub mod issue_email_code;
pub mod issue_link_code;
pub mod redeem_email_code;
pub mod redeem_link_code;

pub use issue_email_code::issue_email_code;
pub use issue_link_code::issue_link_code;
pub use redeem_email_code::{redeem_email_code, RedeemEmailResult};
pub use redeem_link_code::{redeem_link_code, RedeemLinkResult};
