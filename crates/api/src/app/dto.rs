use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chapel_auth::{Identity, Role, Tenant};
use chapel_core::{DomainError, TenantId, UserId};

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantFilterQuery {
    pub tenant_id: Option<String>,
}

impl TenantFilterQuery {
    pub fn tenant_id(&self) -> Result<Option<TenantId>, DomainError> {
        parse_optional_id(self.tenant_id.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

fn parse_optional_id(raw: Option<&str>) -> Result<Option<TenantId>, DomainError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse().map(Some),
        None => Ok(None),
    }
}

// -------------------------
// Response views
// -------------------------

/// Admin-facing view of an identity. Secrets never leave the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for UserView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            tenant_id: identity.tenant_id,
            is_verified: identity.is_verified,
            created_at: identity.created_at,
        }
    }
}

pub fn users_to_views(identities: &[Identity]) -> Vec<UserView> {
    identities.iter().map(UserView::from).collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreated<'a> {
    pub success: bool,
    pub tenant: &'a Tenant,
    pub admin: UserView,
}
