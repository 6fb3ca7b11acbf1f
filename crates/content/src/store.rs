//! Repository traits for tenant-scoped content.
//!
//! Reads take a [`TenantScope`]; adapters apply it as a storage predicate.

use async_trait::async_trait;

use chapel_auth::TenantScope;
use chapel_core::{ContentId, StoreResult, TenantId};

use crate::model::{ContentKind, ContentRecord, LiveStreamConfig, PrayerRequest};

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Records of `kind` visible under `scope`, in listing order.
    async fn list(&self, kind: ContentKind, scope: &TenantScope) -> StoreResult<Vec<ContentRecord>>;

    /// `None` when absent or filtered out by `scope`.
    async fn get(&self, kind: ContentKind, id: ContentId, scope: &TenantScope) -> StoreResult<Option<ContentRecord>>;

    async fn insert(&self, record: ContentRecord) -> StoreResult<ContentRecord>;

    async fn update(&self, record: ContentRecord) -> StoreResult<Option<ContentRecord>>;

    async fn delete(&self, id: ContentId) -> StoreResult<bool>;
}

#[async_trait]
pub trait PrayerRequestRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, scope: &TenantScope) -> StoreResult<Vec<PrayerRequest>>;

    async fn get(&self, id: ContentId, scope: &TenantScope) -> StoreResult<Option<PrayerRequest>>;

    async fn insert(&self, request: PrayerRequest) -> StoreResult<PrayerRequest>;

    async fn delete(&self, id: ContentId) -> StoreResult<bool>;
}

#[async_trait]
pub trait LiveStreamRepository: Send + Sync {
    async fn get(&self, tenant_id: TenantId) -> StoreResult<Option<LiveStreamConfig>>;

    /// Insert or replace the tenant's configuration.
    async fn upsert(&self, config: LiveStreamConfig) -> StoreResult<LiveStreamConfig>;
}
