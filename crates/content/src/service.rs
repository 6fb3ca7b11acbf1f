use std::sync::Arc;

use chrono::Utc;

use chapel_auth::{filter_for, owns_resource, require_role, AuthzError, Role, Session, TenantRepository};
use chapel_core::{ContentId, DomainError, DomainResult, TenantId};

use crate::model::{
    ContentKind, ContentPatch, ContentRecord, LiveStreamConfig, LiveStreamUpdate, NewContent, NewPrayerRequest,
    PrayerRequest,
};
use crate::store::{ContentRepository, LiveStreamRepository, PrayerRequestRepository};

/// Reads are scoped with [`filter_for`]; writes additionally pass the guards.
#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    prayers: Arc<dyn PrayerRequestRepository>,
    live_streams: Arc<dyn LiveStreamRepository>,
    tenants: Arc<dyn TenantRepository>,
}

impl ContentService {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        prayers: Arc<dyn PrayerRequestRepository>,
        live_streams: Arc<dyn LiveStreamRepository>,
        tenants: Arc<dyn TenantRepository>,
    ) -> Self {
        Self { content, prayers, live_streams, tenants }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sections, notifications, schedules
    // ─────────────────────────────────────────────────────────────────────

    pub async fn list(&self, session: Option<&Session>, kind: ContentKind) -> DomainResult<Vec<ContentRecord>> {
        let scope = filter_for(session);
        Ok(self.content.list(kind, &scope).await?)
    }

    /// Out-of-scope records are reported as missing.
    pub async fn get(&self, session: Option<&Session>, kind: ContentKind, id: ContentId) -> DomainResult<ContentRecord> {
        let scope = filter_for(session);
        self.content.get(kind, id, &scope).await?.ok_or(DomainError::NotFound)
    }

    pub async fn create(&self, session: &Session, kind: ContentKind, input: NewContent) -> DomainResult<ContentRecord> {
        require_role(session, Role::ChurchAdmin)?;

        let tenant_id = if session.is_super_admin() {
            if let Some(t) = input.tenant_id {
                self.ensure_tenant_exists(t).await?;
            }
            input.tenant_id
        } else {
            Some(session.tenant_id.ok_or(AuthzError::NoTenant)?)
        };

        let title = required_text(&input.title, "title")?;
        if kind == ContentKind::Schedule && input.scheduled_for.is_none() {
            return Err(DomainError::validation("scheduledFor is required for schedules"));
        }

        let now = Utc::now();
        let record = ContentRecord {
            id: ContentId::new(),
            kind,
            tenant_id,
            title,
            body: input.body,
            scheduled_for: input.scheduled_for,
            created_by: Some(session.user_id),
            created_at: now,
            updated_at: now,
        };

        let record = self.content.insert(record).await?;
        tracing::info!(user_id = %session.user_id, %kind, id = %record.id, tenant_id = ?record.tenant_id, "content created");
        Ok(record)
    }

    pub async fn update(
        &self,
        session: &Session,
        kind: ContentKind,
        id: ContentId,
        patch: ContentPatch,
    ) -> DomainResult<ContentRecord> {
        let mut record = self.writable(session, kind, id).await?;

        if let Some(title) = &patch.title {
            record.title = required_text(title, "title")?;
        }
        if let Some(body) = patch.body {
            record.body = body;
        }
        if let Some(scheduled_for) = patch.scheduled_for {
            if kind == ContentKind::Schedule && scheduled_for.is_none() {
                return Err(DomainError::validation("scheduledFor is required for schedules"));
            }
            record.scheduled_for = scheduled_for;
        }
        record.updated_at = Utc::now();

        self.content.update(record).await?.ok_or(DomainError::NotFound)
    }

    pub async fn delete(&self, session: &Session, kind: ContentKind, id: ContentId) -> DomainResult<()> {
        let record = self.writable(session, kind, id).await?;
        if !self.content.delete(record.id).await? {
            return Err(DomainError::NotFound);
        }
        tracing::info!(user_id = %session.user_id, %kind, %id, "content deleted");
        Ok(())
    }

    /// Load a record for mutation: in scope (else `NotFound`) and owned (else `Forbidden`).
    async fn writable(&self, session: &Session, kind: ContentKind, id: ContentId) -> DomainResult<ContentRecord> {
        require_role(session, Role::ChurchAdmin)?;
        let record = self.get(Some(session), kind, id).await?;
        if !owns_resource(session, record.tenant_id) {
            tracing::warn!(user_id = %session.user_id, %kind, %id, "content write denied");
            return Err(AuthzError::TenantMismatch.into());
        }
        Ok(record)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Prayer requests
    // ─────────────────────────────────────────────────────────────────────

    pub async fn list_prayer_requests(&self, session: Option<&Session>) -> DomainResult<Vec<PrayerRequest>> {
        Ok(self.prayers.list(&filter_for(session)).await?)
    }

    pub async fn get_prayer_request(&self, session: Option<&Session>, id: ContentId) -> DomainResult<PrayerRequest> {
        self.prayers.get(id, &filter_for(session)).await?.ok_or(DomainError::NotFound)
    }

    /// Any tenant member may post; the request lands in their own tenant.
    pub async fn create_prayer_request(&self, session: &Session, input: NewPrayerRequest) -> DomainResult<PrayerRequest> {
        if !session.is_super_admin() && session.tenant_id.is_none() {
            return Err(AuthzError::NoTenant.into());
        }
        let request = required_text(&input.request, "request")?;

        let prayer = PrayerRequest {
            id: ContentId::new(),
            tenant_id: session.tenant_id,
            author_id: session.user_id,
            name: input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            request,
            created_at: Utc::now(),
        };
        let prayer = self.prayers.insert(prayer).await?;
        tracing::info!(user_id = %session.user_id, id = %prayer.id, "prayer request created");
        Ok(prayer)
    }

    /// Authors may delete their own requests; church admins those of their tenant.
    pub async fn delete_prayer_request(&self, session: &Session, id: ContentId) -> DomainResult<()> {
        let prayer = self.get_prayer_request(Some(session), id).await?;

        let allowed = prayer.author_id == session.user_id
            || (session.has_role(Role::ChurchAdmin) && owns_resource(session, prayer.tenant_id));
        if !allowed {
            tracing::warn!(user_id = %session.user_id, %id, "prayer request deletion denied");
            return Err(DomainError::forbidden("only the author or a church admin may delete this request"));
        }

        if !self.prayers.delete(id).await? {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Live stream
    // ─────────────────────────────────────────────────────────────────────

    /// Public read.
    pub async fn live_stream(&self, tenant_id: TenantId) -> DomainResult<Option<LiveStreamConfig>> {
        Ok(self.live_streams.get(tenant_id).await?)
    }

    /// Superadmins must name the tenant; there is no implicit fallback.
    pub async fn set_live_stream(&self, session: &Session, update: LiveStreamUpdate) -> DomainResult<LiveStreamConfig> {
        require_role(session, Role::ChurchAdmin)?;

        let tenant_id = if session.is_super_admin() {
            let t = update.tenant_id.ok_or_else(|| DomainError::validation("choose a tenant"))?;
            self.ensure_tenant_exists(t).await?;
            t
        } else {
            let own = session.tenant_id.ok_or(AuthzError::NoTenant)?;
            if update.tenant_id.is_some_and(|t| t != own) {
                return Err(AuthzError::TenantMismatch.into());
            }
            own
        };

        let stream_url = update.stream_url.trim();
        if !(stream_url.starts_with("https://") || stream_url.starts_with("http://")) {
            return Err(DomainError::validation("streamUrl must be an http(s) URL"));
        }

        let config = LiveStreamConfig {
            tenant_id,
            stream_url: stream_url.to_string(),
            is_live: update.is_live,
            title: update.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            updated_at: Utc::now(),
            updated_by: Some(session.user_id),
        };
        let config = self.live_streams.upsert(config).await?;
        tracing::info!(user_id = %session.user_id, %tenant_id, is_live = config.is_live, "live stream updated");
        Ok(config)
    }

    async fn ensure_tenant_exists(&self, tenant_id: TenantId) -> DomainResult<()> {
        match self.tenants.find_by_id(tenant_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation("unknown church")),
        }
    }
}

fn required_text(value: &str, field: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
