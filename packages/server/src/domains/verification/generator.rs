//! Verification-code value generation.

use rand::Rng;

use super::models::CodePurpose;

/// Width of every generated code value.
pub const CODE_LEN: usize = 6;

/// Alphabet for account-link codes.
///
/// Email codes stay numeric so they can be typed from a verification email
/// without ambiguity; link codes travel through chat messages and get the
/// wider set because their 15-minute exposure window leaves collisions more
/// room than the email flow's.
const LINK_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a fresh code value for `purpose`.
///
/// Values are drawn uniformly at random on every call - never from a counter,
/// so codes issued for the same subject in the same time window cannot be
/// predicted from one another. Uniqueness among live codes is the store's
/// job; the ledger retries on collision.
pub fn generate_code(purpose: CodePurpose) -> String {
    let mut rng = rand::thread_rng();
    match purpose {
        CodePurpose::EmailVerification => format!("{:06}", rng.gen_range(0..1_000_000)),
        CodePurpose::AccountLink => (0..CODE_LEN)
            .map(|_| LINK_ALPHABET[rng.gen_range(0..LINK_ALPHABET.len())] as char)
            .collect(),
    }
}
