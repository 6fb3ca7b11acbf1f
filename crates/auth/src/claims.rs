use serde::{Deserialize, Serialize};

use chapel_core::{TenantId, UserId};

use crate::token::TokenError;
use crate::Role;

/// Session token claims.
///
/// Timestamps are Unix seconds, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject identity.
    pub sub: UserId,

    pub role: Role,

    /// `None` for superadmins without a home tenant and for degraded accounts.
    pub tenant_id: Option<TenantId>,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

/// Deterministically validate the time window of decoded claims.
///
/// The token is expired at the exact expiry instant.
pub fn validate_claims(claims: &SessionClaims, now: i64) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::Malformed);
    }
    if now < claims.iat {
        return Err(TokenError::Malformed);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
