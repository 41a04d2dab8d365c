use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Role name enum
///
/// Stable identifiers for the platform's roles. The string forms are what the
/// session layer stores and what route declarations are written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    Admin,
    User,
    PrOfficer,
    TechOfficer,
    ExternalMaintainer,
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleName::Admin => write!(f, "admin"),
            RoleName::User => write!(f, "user"),
            RoleName::PrOfficer => write!(f, "pr_officer"),
            RoleName::TechOfficer => write!(f, "tech_officer"),
            RoleName::ExternalMaintainer => write!(f, "external_maintainer"),
        }
    }
}

impl std::str::FromStr for RoleName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(RoleName::Admin),
            "user" => Ok(RoleName::User),
            "pr_officer" => Ok(RoleName::PrOfficer),
            "tech_officer" => Ok(RoleName::TechOfficer),
            "external_maintainer" => Ok(RoleName::ExternalMaintainer),
            _ => Err(anyhow::anyhow!("Invalid role name: {}", s)),
        }
    }
}

/// A role in the catalog: stable name, display label, and whether the role
/// belongs to municipal staff.
///
/// Derived predicates (`is_admin`, `is_citizen`) are computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Role {
    pub name: RoleName,
    pub label: &'static str,
    pub is_municipal: bool,
}

impl Role {
    /// Platform administrator.
    pub fn is_admin(&self) -> bool {
        self.name == RoleName::Admin
    }

    /// Base citizen role - the only role subject to status-based report
    /// visibility suppression.
    pub fn is_citizen(&self) -> bool {
        self.name == RoleName::User
    }
}

/// The static set of roles known to the platform.
///
/// Roles are configuration, not data: they never change at runtime, so the
/// catalog is compiled in rather than read from storage.
const ROLES: [Role; 5] = [
    Role {
        name: RoleName::Admin,
        label: "Administrator",
        is_municipal: false,
    },
    Role {
        name: RoleName::User,
        label: "Citizen",
        is_municipal: false,
    },
    Role {
        name: RoleName::PrOfficer,
        label: "Public Relations Officer",
        is_municipal: true,
    },
    Role {
        name: RoleName::TechOfficer,
        label: "Technical Officer",
        is_municipal: true,
    },
    Role {
        name: RoleName::ExternalMaintainer,
        label: "External Maintainer",
        is_municipal: false,
    },
];

/// Lookup into the static role set.
pub struct RoleCatalog;

impl RoleCatalog {
    /// All roles, in declaration order.
    pub fn all() -> &'static [Role] {
        &ROLES
    }

    /// The role for a given name.
    pub fn get(name: RoleName) -> Role {
        // Indexed to match declaration order in ROLES.
        let idx = match name {
            RoleName::Admin => 0,
            RoleName::User => 1,
            RoleName::PrOfficer => 2,
            RoleName::TechOfficer => 3,
            RoleName::ExternalMaintainer => 4,
        };
        ROLES[idx]
    }

    /// Resolve a stored role string, if it names a known role.
    pub fn by_name(name: &str) -> Option<Role> {
        let parsed: RoleName = name.parse().ok()?;
        Some(Self::get(parsed))
    }
}
