//! Repository traits
//!
//! Storage adapters implement these; the auth core only ever talks to the traits.

use async_trait::async_trait;

use chapel_core::{StoreResult, TenantId, UserId};

use crate::{Identity, Role, Tenant};

/// Identity repository trait
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>>;

    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<Identity>>;

    /// All identities, or only those of `tenant` when given. Ordered by creation time.
    async fn list(&self, tenant: Option<TenantId>) -> StoreResult<Vec<Identity>>;

    async fn count_by_role(&self, role: Role) -> StoreResult<u64>;

    /// Insert a new identity. Duplicate e-mail is a `UniqueViolation`.
    async fn insert(&self, identity: Identity) -> StoreResult<Identity>;

    /// Overwrite an existing identity (last write wins). `None` if it is gone.
    async fn update(&self, identity: Identity) -> StoreResult<Option<Identity>>;

    /// Returns `true` when a row was removed.
    async fn delete(&self, id: UserId) -> StoreResult<bool>;
}

/// Tenant repository trait
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>>;

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>>;

    async fn list(&self) -> StoreResult<Vec<Tenant>>;

    /// Create a tenant together with its first admin, all or nothing.
    ///
    /// A duplicate slug or admin e-mail fails the whole operation and leaves no
    /// tenant row behind.
    async fn create_with_admin(&self, tenant: Tenant, admin: Identity) -> StoreResult<(Tenant, Identity)>;
}
