use crate::common::entity_ids::{OfficeId, UserId};

use super::roles::{Role, RoleCatalog, RoleName};

/// The authenticated actor behind a request.
///
/// Resolved by the session layer before any call into this crate; an
/// unauthenticated request is `Option<&Principal> = None`. A principal always
/// carries a role - session resolution that cannot attach one must yield
/// `None` instead.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    /// Office the principal belongs to, for municipal staff.
    pub office_id: Option<OfficeId>,
}

impl Principal {
    pub fn new(id: UserId, role: RoleName) -> Self {
        Self {
            id,
            role: RoleCatalog::get(role),
            office_id: None,
        }
    }

    pub fn with_office(id: UserId, role: RoleName, office_id: OfficeId) -> Self {
        Self {
            id,
            role: RoleCatalog::get(role),
            office_id: Some(office_id),
        }
    }
}
