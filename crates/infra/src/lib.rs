//! Infrastructure layer: storage adapters for every repository trait.

pub mod memory;
pub mod postgres;


use std::sync::Arc;

use chapel_auth::{IdentityRepository, TenantRepository};
use chapel_content::{ContentRepository, LiveStreamRepository, PrayerRequestRepository};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Every repository the services need, backed by one store.
#[derive(Clone)]
pub struct Repositories {
    pub identities: Arc<dyn IdentityRepository>,
    pub tenants: Arc<dyn TenantRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub prayers: Arc<dyn PrayerRequestRepository>,
    pub live_streams: Arc<dyn LiveStreamRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: IdentityRepository
            + TenantRepository
            + ContentRepository
            + PrayerRequestRepository
            + LiveStreamRepository
            + 'static,
    {
        Self {
            identities: store.clone(),
            tenants: store.clone(),
            content: store.clone(),
            prayers: store.clone(),
            live_streams: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}
