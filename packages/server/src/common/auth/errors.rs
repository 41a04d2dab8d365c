use thiserror::Error;

use super::roles::RoleName;

/// Authorization errors for gated endpoints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no resolved principal, or the session layer could
    /// not attach a role to it.
    #[error("Authentication required")]
    NoPrincipalOrRole,

    /// The principal's role is not in the endpoint's allowed set.
    #[error("Role '{0}' is not permitted for this operation")]
    RoleNotPermitted(RoleName),
}

impl AuthError {
    /// Client-facing message.
    ///
    /// Both variants collapse into the same external denial so responses do
    /// not reveal whether a session or a role was missing.
    pub fn public_message(&self) -> &'static str {
        "Forbidden"
    }
}
