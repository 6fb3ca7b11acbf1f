//! Session resolution.
//!
//! A session is never stored server-side. It is rebuilt on every request from
//! the signed token and a fresh read of the identity the token names, so role
//! and tenant always reflect the database rather than the token.

use std::sync::Arc;

use serde::Serialize;

use chapel_core::{DomainError, DomainResult, TenantId, UserId};

use crate::store::{IdentityRepository, TenantRepository};
use crate::token::{IssuedToken, TokenCodec, TokenError};
use crate::{Identity, Role, TenantSummary};

/// Request-scoped, database-verified view of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub tenant: Option<TenantSummary>,
}

impl Session {
    pub fn from_identity(identity: &Identity, tenant: Option<TenantSummary>) -> Self {
        Self {
            user_id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            tenant_id: identity.tenant_id,
            tenant,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    pub fn has_role(&self, min: Role) -> bool {
        self.role.satisfies(min)
    }
}

/// Resolve an optional session into a present one, or `Unauthenticated`.
pub fn require_session(session: Option<&Session>) -> DomainResult<&Session> {
    session.ok_or(DomainError::Unauthenticated)
}

/// Binds the token codec to identity storage.
#[derive(Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    identities: Arc<dyn IdentityRepository>,
    tenants: Arc<dyn TenantRepository>,
}

impl SessionManager {
    pub fn new(
        codec: Arc<TokenCodec>,
        identities: Arc<dyn IdentityRepository>,
        tenants: Arc<dyn TenantRepository>,
    ) -> Self {
        Self { codec, identities, tenants }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Mint a token for a freshly authenticated identity.
    pub fn issue(&self, identity: &Identity) -> DomainResult<IssuedToken> {
        self.codec.issue(identity).map_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
            DomainError::internal(e.to_string())
        })
    }

    /// Token → verify → load identity (with tenant summary).
    ///
    /// `None` when the token is absent, invalid, or names an identity that no
    /// longer exists. Has no side effects.
    pub async fn resolve_current(&self, token: Option<&str>) -> DomainResult<Option<Session>> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                log_rejection(&e);
                return Ok(None);
            }
        };

        let Some(identity) = self.identities.find_by_id(claims.sub).await? else {
            tracing::debug!(user_id = %claims.sub, "session names a deleted identity");
            return Ok(None);
        };

        let tenant = match identity.tenant_id {
            Some(tenant_id) => self.tenants.find_by_id(tenant_id).await?.map(|t| t.summary()),
            None => None,
        };

        Ok(Some(Session::from_identity(&identity, tenant)))
    }

    pub async fn require_session(&self, token: Option<&str>) -> DomainResult<Session> {
        self.resolve_current(token).await?.ok_or(DomainError::Unauthenticated)
    }

    /// Require a session whose role is at least `min`.
    pub async fn require_role(&self, token: Option<&str>, min: Role) -> DomainResult<Session> {
        let session = self.require_session(token).await?;
        crate::authorize::require_role(&session, min)?;
        Ok(session)
    }

    pub async fn require_super_admin(&self, token: Option<&str>) -> DomainResult<Session> {
        self.require_role(token, Role::SuperAdmin).await
    }
}

fn log_rejection(error: &TokenError) {
    tracing::debug!(reason = %error, "session token rejected");
}
