use core::str::FromStr;

use serde::{Deserialize, Serialize};

use chapel_core::DomainError;

/// Role of an identity.
///
/// Roles form a total order for "at least" checks:
/// `SUPERADMIN > CHURCH_ADMIN > USER`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Operates across all tenants.
    #[serde(rename = "SUPERADMIN")]
    SuperAdmin,
    /// Administers a single tenant.
    #[serde(rename = "CHURCH_ADMIN")]
    ChurchAdmin,
    /// Member of a single tenant.
    #[serde(rename = "USER")]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::ChurchAdmin, Role::User];

    fn rank(self) -> u8 {
        match self {
            Role::SuperAdmin => 3,
            Role::ChurchAdmin => 2,
            Role::User => 1,
        }
    }

    /// Whether this role is at least `min`.
    pub fn satisfies(self, min: Role) -> bool {
        self.rank() >= min.rank()
    }

    pub fn is_super_admin(self) -> bool {
        self == Role::SuperAdmin
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPERADMIN",
            Role::ChurchAdmin => "CHURCH_ADMIN",
            Role::User => "USER",
        }
    }

    /// Landing page for an authenticated identity of this role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::SuperAdmin => "/superadmin",
            Role::ChurchAdmin => "/admin",
            Role::User => "/dashboard",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SUPERADMIN" => Ok(Role::SuperAdmin),
            "CHURCH_ADMIN" => Ok(Role::ChurchAdmin),
            "USER" => Ok(Role::User),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
