/// Authorization module for the civic-reporting platform
///
/// Roles, principals, and the endpoint-level access policy. Route handlers
/// declare their allowed roles as data and check them before doing anything:
///
/// ```rust,ignore
/// use server_core::common::auth::{RoleName, RouteAccess};
///
/// // At route registration:
/// let access = RouteAccess::roles([RoleName::Admin, RoleName::TechOfficer]);
///
/// // In the handler, before any side effects:
/// access.permits(principal.as_ref())?;
/// ```
mod errors;
mod policy;
mod principal;
mod roles;

pub use errors::AuthError;
pub use policy::{authorize, RouteAccess};
pub use principal::Principal;
pub use roles::{Role, RoleCatalog, RoleName};
