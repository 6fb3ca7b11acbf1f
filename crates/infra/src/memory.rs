//! In-memory store for tests and local development.
//!
//! One `RwLock` guards every table, so multi-table writes such as tenant +
//! first admin are atomic by construction.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use chapel_auth::{Identity, IdentityRepository, Role, Tenant, TenantRepository, TenantScope};
use chapel_content::{
    listing_order, ContentKind, ContentRecord, ContentRepository, LiveStreamConfig, LiveStreamRepository,
    PrayerRequest, PrayerRequestRepository,
};
use chapel_core::{ContentId, Entity, StoreError, StoreResult, TenantId, UserId};

#[derive(Debug, Default)]
struct State {
    identities: HashMap<UserId, Identity>,
    tenants: HashMap<TenantId, Tenant>,
    content: HashMap<ContentId, ContentRecord>,
    prayers: HashMap<ContentId, PrayerRequest>,
    live_streams: HashMap<TenantId, LiveStreamConfig>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.identities
            .values()
            .any(|i| i.email == email && Some(i.id) != except)
    }

    fn slug_taken(&self, slug: &str) -> bool {
        self.tenants.values().any(|t| t.slug == slug)
    }
}

fn put<E: Entity + Clone>(table: &mut HashMap<E::Id, E>, row: &E) {
    table.insert(row.id(), row.clone());
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl IdentityRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        Ok(self.read()?.identities.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        Ok(self.read()?.identities.values().find(|i| i.email == email).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<Identity>> {
        Ok(self
            .read()?
            .identities
            .values()
            .find(|i| i.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list(&self, tenant: Option<TenantId>) -> StoreResult<Vec<Identity>> {
        let state = self.read()?;
        let mut out: Vec<Identity> = state
            .identities
            .values()
            .filter(|i| tenant.is_none() || i.tenant_id == tenant)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        Ok(self.read()?.identities.values().filter(|i| i.role == role).count() as u64)
    }

    async fn insert(&self, identity: Identity) -> StoreResult<Identity> {
        let mut state = self.write()?;
        if state.email_taken(&identity.email, None) {
            return Err(StoreError::UniqueViolation("email".into()));
        }
        put(&mut state.identities, &identity);
        Ok(identity)
    }

    async fn update(&self, identity: Identity) -> StoreResult<Option<Identity>> {
        let mut state = self.write()?;
        if !state.identities.contains_key(&identity.id) {
            return Ok(None);
        }
        if state.email_taken(&identity.email, Some(identity.id)) {
            return Err(StoreError::UniqueViolation("email".into()));
        }
        put(&mut state.identities, &identity);
        Ok(Some(identity))
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.write()?.identities.remove(&id).is_some())
    }
}

#[async_trait]
impl TenantRepository for InMemoryStore {
    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        Ok(self.read()?.tenants.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>> {
        Ok(self.read()?.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Tenant>> {
        let mut out: Vec<Tenant> = self.read()?.tenants.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn create_with_admin(&self, tenant: Tenant, admin: Identity) -> StoreResult<(Tenant, Identity)> {
        let mut state = self.write()?;
        // Check everything before touching any table.
        if state.slug_taken(&tenant.slug) {
            return Err(StoreError::UniqueViolation("slug".into()));
        }
        if state.email_taken(&admin.email, None) {
            return Err(StoreError::UniqueViolation("email".into()));
        }
        put(&mut state.tenants, &tenant);
        put(&mut state.identities, &admin);
        Ok((tenant, admin))
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn list(&self, kind: ContentKind, scope: &TenantScope) -> StoreResult<Vec<ContentRecord>> {
        let state = self.read()?;
        let mut out: Vec<ContentRecord> = state
            .content
            .values()
            .filter(|r| r.kind == kind && scope.matches(r.tenant_id))
            .cloned()
            .collect();
        out.sort_by(listing_order);
        Ok(out)
    }

    async fn get(&self, kind: ContentKind, id: ContentId, scope: &TenantScope) -> StoreResult<Option<ContentRecord>> {
        Ok(self
            .read()?
            .content
            .get(&id)
            .filter(|r| r.kind == kind && scope.matches(r.tenant_id))
            .cloned())
    }

    async fn insert(&self, record: ContentRecord) -> StoreResult<ContentRecord> {
        put(&mut self.write()?.content, &record);
        Ok(record)
    }

    async fn update(&self, record: ContentRecord) -> StoreResult<Option<ContentRecord>> {
        let mut state = self.write()?;
        if !state.content.contains_key(&record.id) {
            return Ok(None);
        }
        put(&mut state.content, &record);
        Ok(Some(record))
    }

    async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        Ok(self.write()?.content.remove(&id).is_some())
    }
}

#[async_trait]
impl PrayerRequestRepository for InMemoryStore {
    async fn list(&self, scope: &TenantScope) -> StoreResult<Vec<PrayerRequest>> {
        let state = self.read()?;
        let mut out: Vec<PrayerRequest> = state
            .prayers
            .values()
            .filter(|p| scope.matches(p.tenant_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get(&self, id: ContentId, scope: &TenantScope) -> StoreResult<Option<PrayerRequest>> {
        Ok(self.read()?.prayers.get(&id).filter(|p| scope.matches(p.tenant_id)).cloned())
    }

    async fn insert(&self, request: PrayerRequest) -> StoreResult<PrayerRequest> {
        put(&mut self.write()?.prayers, &request);
        Ok(request)
    }

    async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        Ok(self.write()?.prayers.remove(&id).is_some())
    }
}

#[async_trait]
impl LiveStreamRepository for InMemoryStore {
    async fn get(&self, tenant_id: TenantId) -> StoreResult<Option<LiveStreamConfig>> {
        Ok(self.read()?.live_streams.get(&tenant_id).cloned())
    }

    async fn upsert(&self, config: LiveStreamConfig) -> StoreResult<LiveStreamConfig> {
        self.write()?.live_streams.insert(config.tenant_id, config.clone());
        Ok(config)
    }
}
