//! Identity records (authenticatable accounts).
//!
//! An identity belongs to at most one tenant. `SUPERADMIN` identities operate
//! across all tenants; every other role needs a tenant to be useful, and the
//! "no tenant" state is handled as an explicit error path by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chapel_core::{DomainError, DomainResult, Entity, TenantId, UserId};

use crate::Role;

/// Durable account record.
///
/// `password_hash` is an opaque PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    /// Unique, case-sensitive login key.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub is_verified: bool,
    #[serde(skip_serializing, default)]
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Identity {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl Identity {
    /// Build a fresh identity. Inputs are expected to be validated already.
    pub fn new(
        email: String,
        password_hash: String,
        name: Option<String>,
        role: Role,
        tenant_id: Option<TenantId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            name,
            role,
            tenant_id,
            is_verified: false,
            verification_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    /// Non-superadmin identities without a tenant are in the degraded state.
    pub fn lacks_required_tenant(&self) -> bool {
        !self.is_super_admin() && self.tenant_id.is_none()
    }
}

/// Partial update applied through the admin path.
///
/// `tenant_id: Some(None)` detaches the identity from its tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "double_option")]
    pub tenant_id: Option<Option<TenantId>>,
    pub password: Option<String>,
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl IdentityPatch {
    /// Whether applying this patch would move `target` to a different tenant.
    pub fn changes_tenant(&self, target: &Identity) -> bool {
        matches!(self.tenant_id, Some(t) if t != target.tenant_id)
    }

    /// Whether applying this patch would change `target`'s role.
    pub fn changes_role(&self, target: &Identity) -> bool {
        matches!(self.role, Some(r) if r != target.role)
    }
}

/// Validate and normalize an e-mail address (trimmed, case preserved).
pub fn validate_email(email: &str) -> DomainResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::validation("email is required"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("invalid email format"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email.to_string())
}

/// Validate a new plaintext password against the minimum length policy.
pub fn validate_password(password: &str, min_len: usize) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::validation("password is required"));
    }
    if password.chars().count() < min_len {
        return Err(DomainError::validation(format!(
            "password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

/// Normalize an optional display name (blank → `None`).
pub fn normalize_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}
