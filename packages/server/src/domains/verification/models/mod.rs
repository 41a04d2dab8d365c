pub mod verification_code;

pub use verification_code::{CodePurpose, InsertOutcome, VerificationCode};
