//! Mock repositories for testing

use std::sync::Arc;

use async_trait::async_trait;
use chapel_auth::{Identity, IdentityRepository, Role, Tenant, TenantRepository};
use chapel_core::{StoreError, StoreResult, TenantId, UserId};
use chrono::Utc;
use dashmap::DashMap;

/// In-memory identity repository for testing
#[derive(Default, Clone)]
pub struct MockIdentityRepository {
    identities: Arc<DashMap<UserId, Identity>>,
}

impl MockIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test identity directly
    pub fn insert_identity(&self, identity: Identity) {
        self.identities.insert(identity.id, identity);
    }

    /// Build a test identity with the given role and tenant
    #[allow(dead_code)]
    pub fn test_identity(role: Role, tenant_id: Option<TenantId>) -> Identity {
        Identity::new(
            format!("test-{}@example.com", UserId::new()),
            String::new(),
            Some("Test".into()),
            role,
            tenant_id,
            Utc::now(),
        )
    }
}

#[async_trait]
impl IdentityRepository for MockIdentityRepository {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        Ok(self.identities.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        Ok(self
            .identities
            .iter()
            .find(|r| r.value().email == email)
            .map(|r| r.value().clone()))
    }

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<Identity>> {
        Ok(self
            .identities
            .iter()
            .find(|r| r.value().verification_token.as_deref() == Some(token))
            .map(|r| r.value().clone()))
    }

    async fn list(&self, tenant: Option<TenantId>) -> StoreResult<Vec<Identity>> {
        let mut out: Vec<Identity> = self
            .identities
            .iter()
            .filter(|r| tenant.is_none() || r.value().tenant_id == tenant)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by_key(|i| i.created_at);
        Ok(out)
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        Ok(self.identities.iter().filter(|r| r.value().role == role).count() as u64)
    }

    async fn insert(&self, identity: Identity) -> StoreResult<Identity> {
        if self.identities.iter().any(|r| r.value().email == identity.email) {
            return Err(StoreError::UniqueViolation("email".into()));
        }
        self.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update(&self, identity: Identity) -> StoreResult<Option<Identity>> {
        match self.identities.get_mut(&identity.id) {
            Some(mut existing) => {
                *existing = identity.clone();
                Ok(Some(identity))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.identities.remove(&id).is_some())
    }
}

/// In-memory tenant repository for testing
#[derive(Clone)]
pub struct MockTenantRepository {
    tenants: Arc<DashMap<TenantId, Tenant>>,
    identities: MockIdentityRepository,
}

impl MockTenantRepository {
    pub fn new(identities: MockIdentityRepository) -> Self {
        Self { tenants: Arc::new(DashMap::new()), identities }
    }

    /// Insert a test tenant directly
    pub fn insert_tenant(&self, tenant: Tenant) {
        self.tenants.insert(tenant.id, tenant);
    }

    pub fn test_tenant(slug: &str, name: &str) -> Tenant {
        let now = Utc::now();
        Tenant {
            id: TenantId::new(),
            slug: slug.into(),
            name: name.into(),
            contact_email: None,
            contact_phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl TenantRepository for MockTenantRepository {
    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        Ok(self.tenants.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>> {
        Ok(self.tenants.iter().find(|r| r.value().slug == slug).map(|r| r.value().clone()))
    }

    async fn list(&self) -> StoreResult<Vec<Tenant>> {
        Ok(self.tenants.iter().map(|r| r.value().clone()).collect())
    }

    async fn create_with_admin(&self, tenant: Tenant, admin: Identity) -> StoreResult<(Tenant, Identity)> {
        if self.tenants.iter().any(|r| r.value().slug == tenant.slug) {
            return Err(StoreError::UniqueViolation("slug".into()));
        }
        let admin = self.identities.insert(admin).await?;
        self.tenants.insert(tenant.id, tenant.clone());
        Ok((tenant, admin))
    }
}
