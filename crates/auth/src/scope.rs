//! Tenant filter builder.
//!
//! Turns a session into the storage predicate that scopes tenant-aware reads.
//! All content kinds use the same predicate, so isolation rules live in one place.

use serde::Serialize;

use chapel_core::TenantId;

use crate::Session;

/// Storage predicate over a record's nullable tenant reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "tenant_id", rename_all = "snake_case")]
pub enum TenantScope {
    /// `tenant_id IS NULL`
    PublicOnly,
    /// No predicate.
    Unrestricted,
    /// `tenant_id = T`
    Only(TenantId),
    /// `tenant_id = T OR tenant_id IS NULL`
    TenantAndPublic(TenantId),
}

impl TenantScope {
    /// Whether a record with `tenant` passes this predicate.
    pub fn matches(&self, tenant: Option<TenantId>) -> bool {
        match (self, tenant) {
            (TenantScope::Unrestricted, _) => true,
            (TenantScope::PublicOnly, t) => t.is_none(),
            (TenantScope::Only(mine), t) => t == Some(*mine),
            (TenantScope::TenantAndPublic(mine), t) => t.is_none() || t == Some(*mine),
        }
    }

    /// The tenant this scope is pinned to, if any.
    pub fn tenant(&self) -> Option<TenantId> {
        match self {
            TenantScope::Only(t) | TenantScope::TenantAndPublic(t) => Some(*t),
            TenantScope::PublicOnly | TenantScope::Unrestricted => None,
        }
    }
}

/// Build the read scope for an optional session.
///
/// - anonymous: public records only
/// - superadmin: unrestricted, narrowed to their own tenant when they carry one
/// - anyone else with tenant `T`: `{T, public}`
/// - anyone else without a tenant: public records only
pub fn filter_for(session: Option<&Session>) -> TenantScope {
    match session {
        None => TenantScope::PublicOnly,
        Some(s) if s.is_super_admin() => match s.tenant_id {
            Some(t) => TenantScope::Only(t),
            None => TenantScope::Unrestricted,
        },
        Some(s) => match s.tenant_id {
            Some(t) => TenantScope::TenantAndPublic(t),
            None => TenantScope::PublicOnly,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Identity, Role};
    use chrono::Utc;

    fn session(role: Role, tenant_id: Option<TenantId>) -> Session {
        let ident = Identity::new("s@example.com".into(), String::new(), None, role, tenant_id, Utc::now());
        Session::from_identity(&ident, None)
    }

    #[test]
    fn anonymous_sees_public_only() {
        let scope = filter_for(None);
        assert_eq!(scope, TenantScope::PublicOnly);
        assert!(scope.matches(None));
        assert!(!scope.matches(Some(TenantId::new())));
    }

    #[test]
    fn superadmin_scope_depends_on_home_tenant() {
        assert_eq!(filter_for(Some(&session(Role::SuperAdmin, None))), TenantScope::Unrestricted);

        let t = TenantId::new();
        let narrowed = filter_for(Some(&session(Role::SuperAdmin, Some(t))));
        assert_eq!(narrowed, TenantScope::Only(t));
        assert!(narrowed.matches(Some(t)));
        assert!(!narrowed.matches(None));
    }

    #[test]
    fn tenant_member_sees_own_and_public() {
        let t = TenantId::new();
        let scope = filter_for(Some(&session(Role::User, Some(t))));
        assert_eq!(scope, TenantScope::TenantAndPublic(t));
        assert_eq!(scope.tenant(), Some(t));
    }

    #[test]
    fn tenantless_member_is_public_only() {
        assert_eq!(filter_for(Some(&session(Role::ChurchAdmin, None))), TenantScope::PublicOnly);
    }
}
