//! Endpoint-level authorization.
//!
//! Role requirements are explicit per-route data: each route registration
//! carries a [`RouteAccess`] listing the roles allowed to call it, and the
//! boundary layer evaluates it with the request's principal before any
//! side-effecting logic runs. No reflection, no ambient auth state.

use super::errors::AuthError;
use super::principal::Principal;
use super::roles::RoleName;

/// Decide whether a principal may perform an action gated by `required`.
///
/// Pure and deterministic: no I/O, no mutation.
///
/// An empty `required` slice means the endpoint is unrestricted. That is an
/// explicit policy choice - absence of a declared requirement is "no role
/// restriction", not "deny all".
pub fn authorize(required: &[RoleName], principal: Option<&Principal>) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }

    let principal = principal.ok_or(AuthError::NoPrincipalOrRole)?;

    if required.contains(&principal.role.name) {
        Ok(())
    } else {
        Err(AuthError::RoleNotPermitted(principal.role.name))
    }
}

/// Allowed-roles declaration attached to a route registration.
#[derive(Debug, Clone, Default)]
pub struct RouteAccess {
    allowed: Vec<RoleName>,
}

impl RouteAccess {
    /// An endpoint with no role restriction.
    pub fn public() -> Self {
        Self {
            allowed: Vec::new(),
        }
    }

    /// An endpoint restricted to the given roles.
    pub fn roles<I>(allowed: I) -> Self
    where
        I: IntoIterator<Item = RoleName>,
    {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// The declared role list.
    pub fn allowed(&self) -> &[RoleName] {
        &self.allowed
    }

    /// Evaluate this declaration against the request's principal.
    pub fn permits(&self, principal: Option<&Principal>) -> Result<(), AuthError> {
        authorize(&self.allowed, principal)
    }
}
