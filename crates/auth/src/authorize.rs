//! Authorization guards.
//!
//! Pure policy checks: no IO, no panics. Every privileged operation passes
//! through one of these before it reads or mutates tenant-scoped data.

use serde::Serialize;
use thiserror::Error;

use chapel_core::{DomainError, TenantId};

use crate::{Identity, IdentityPatch, Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AuthzError {
    #[error("resource belongs to another tenant")]
    TenantMismatch,

    #[error("requires role {required}, caller has {actual}")]
    InsufficientRole { required: Role, actual: Role },

    #[error("cannot grant the SUPERADMIN role")]
    RoleElevation,

    #[error("cannot move an identity to another tenant")]
    TenantChange,

    #[error("cannot set passwords for other identities")]
    PasswordChange,

    #[error("cannot delete your own identity")]
    SelfDeletion,

    #[error("cannot modify a SUPERADMIN identity")]
    ProtectedIdentity,

    #[error("no tenant assigned")]
    NoTenant,
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::Forbidden(value.to_string())
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "denial", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(AuthzError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Require the session role to be at least `min`.
pub fn require_role(session: &Session, min: Role) -> Result<(), AuthzError> {
    if session.role.satisfies(min) {
        Ok(())
    } else {
        tracing::warn!(user_id = %session.user_id, required = %min, actual = %session.role, "role check failed");
        Err(AuthzError::InsufficientRole { required: min, actual: session.role })
    }
}

/// True iff the caller is a superadmin or shares the resource's tenant.
///
/// A session without a tenant owns nothing, including public records.
pub fn owns_resource(session: &Session, resource_tenant: Option<TenantId>) -> bool {
    if session.is_super_admin() {
        return true;
    }
    match (session.tenant_id, resource_tenant) {
        (Some(mine), Some(theirs)) => mine == theirs,
        _ => false,
    }
}

/// Whether `session` may apply `patch` to `target` through the admin path.
pub fn can_mutate_identity(session: &Session, target: &Identity, patch: &IdentityPatch) -> Decision {
    match session.role {
        Role::SuperAdmin => Decision::Allow,
        Role::User => Decision::Deny(AuthzError::InsufficientRole {
            required: Role::ChurchAdmin,
            actual: Role::User,
        }),
        Role::ChurchAdmin => {
            if session.tenant_id.is_none() {
                return Decision::Deny(AuthzError::NoTenant);
            }
            if target.tenant_id != session.tenant_id {
                return Decision::Deny(AuthzError::TenantMismatch);
            }
            if target.is_super_admin() {
                return Decision::Deny(AuthzError::ProtectedIdentity);
            }
            if patch.role == Some(Role::SuperAdmin) {
                return Decision::Deny(AuthzError::RoleElevation);
            }
            if patch.changes_tenant(target) {
                return Decision::Deny(AuthzError::TenantChange);
            }
            if patch.password.is_some() {
                return Decision::Deny(AuthzError::PasswordChange);
            }
            Decision::Allow
        }
    }
}

/// Whether `session` may delete `target` through the admin path.
pub fn can_delete_identity(session: &Session, target: &Identity) -> Decision {
    if session.user_id == target.id {
        return Decision::Deny(AuthzError::SelfDeletion);
    }
    match session.role {
        Role::SuperAdmin => Decision::Allow,
        Role::User => Decision::Deny(AuthzError::InsufficientRole {
            required: Role::ChurchAdmin,
            actual: Role::User,
        }),
        Role::ChurchAdmin => {
            if target.is_super_admin() {
                Decision::Deny(AuthzError::ProtectedIdentity)
            } else if session.tenant_id.is_none() {
                Decision::Deny(AuthzError::NoTenant)
            } else if target.tenant_id != session.tenant_id {
                Decision::Deny(AuthzError::TenantMismatch)
            } else {
                Decision::Allow
            }
        }
    }
}

/// Aborting form of [`can_delete_identity`] for the destructive path.
pub fn ensure_can_delete_identity(session: &Session, target: &Identity) -> Result<(), AuthzError> {
    can_delete_identity(session, target).into_result().inspect_err(|reason| {
        tracing::warn!(user_id = %session.user_id, target = %target.id, %reason, "identity deletion denied");
    })
}
