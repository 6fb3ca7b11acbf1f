use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chapel_core::{DomainError, DomainResult, Entity, TenantId};

/// One church: the unit of data isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    /// URL-safe unique identifier.
    pub slug: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Tenant {
    type Id = TenantId;

    fn id(&self) -> TenantId {
        self.id
    }
}

impl Tenant {
    pub fn summary(&self) -> TenantSummary {
        TenantSummary { id: self.id, name: self.name.clone() }
    }
}

/// Denormalized tenant view carried inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: TenantId,
    pub name: String,
}

/// Validate a tenant slug: non-empty, lowercase ASCII alphanumerics and `-`,
/// not starting or ending with `-`.
pub fn validate_slug(slug: &str) -> DomainResult<String> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(DomainError::validation("slug is required"));
    }
    let allowed = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !allowed || slug.starts_with('-') || slug.ends_with('-') {
        return Err(DomainError::validation(
            "slug may only contain lowercase letters, digits and '-'",
        ));
    }
    Ok(slug.to_string())
}
