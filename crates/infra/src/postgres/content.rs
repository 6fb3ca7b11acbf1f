use async_trait::async_trait;
use sqlx::QueryBuilder;
use tracing::instrument;

use chapel_auth::TenantScope;
use chapel_content::{
    ContentKind, ContentRecord, ContentRepository, LiveStreamConfig, LiveStreamRepository, PrayerRequest,
    PrayerRequestRepository,
};
use chapel_core::{ContentId, StoreResult, TenantId};

use super::rows::{
    opt_uuid, ContentRow, LiveStreamRow, PrayerRow, CONTENT_COLUMNS, LIVE_STREAM_COLUMNS, PRAYER_COLUMNS,
};
use super::{map_sqlx_error, push_scope, PostgresStore};

#[async_trait]
impl ContentRepository for PostgresStore {
    #[instrument(skip(self), fields(kind = %kind), err)]
    async fn list(&self, kind: ContentKind, scope: &TenantScope) -> StoreResult<Vec<ContentRecord>> {
        let mut qb = QueryBuilder::new(format!("SELECT {CONTENT_COLUMNS} FROM content_records WHERE kind = "));
        qb.push_bind(kind.as_str());
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY scheduled_for DESC NULLS LAST, created_at DESC");

        let rows = qb
            .build_query_as::<ContentRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_content", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self), fields(kind = %kind, id = %id), err)]
    async fn get(&self, kind: ContentKind, id: ContentId, scope: &TenantScope) -> StoreResult<Option<ContentRecord>> {
        let mut qb = QueryBuilder::new(format!("SELECT {CONTENT_COLUMNS} FROM content_records WHERE id = "));
        qb.push_bind(*id.as_uuid()).push(" AND kind = ").push_bind(kind.as_str());
        push_scope(&mut qb, scope);

        let row = qb
            .build_query_as::<ContentRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_content", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip_all, fields(kind = %record.kind, id = %record.id, tenant_id = ?record.tenant_id), err)]
    async fn insert(&self, record: ContentRecord) -> StoreResult<ContentRecord> {
        sqlx::query(
            r#"
            INSERT INTO content_records (
                id, kind, tenant_id, title, body, scheduled_for, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.kind.as_str())
        .bind(opt_uuid(record.tenant_id))
        .bind(&record.title)
        .bind(&record.body)
        .bind(record.scheduled_for)
        .bind(opt_uuid(record.created_by))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_content", e))?;
        Ok(record)
    }

    #[instrument(skip_all, fields(id = %record.id), err)]
    async fn update(&self, record: ContentRecord) -> StoreResult<Option<ContentRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE content_records
            SET title = $2, body = $3, scheduled_for = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.title)
        .bind(&record.body)
        .bind(record.scheduled_for)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_content", e))?;
        Ok((result.rows_affected() > 0).then_some(record))
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM content_records WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_content", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PrayerRequestRepository for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self, scope: &TenantScope) -> StoreResult<Vec<PrayerRequest>> {
        let mut qb = QueryBuilder::new(format!("SELECT {PRAYER_COLUMNS} FROM prayer_requests WHERE TRUE"));
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY created_at DESC");

        let rows = qb
            .build_query_as::<PrayerRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_prayer_requests", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: ContentId, scope: &TenantScope) -> StoreResult<Option<PrayerRequest>> {
        let mut qb = QueryBuilder::new(format!("SELECT {PRAYER_COLUMNS} FROM prayer_requests WHERE id = "));
        qb.push_bind(*id.as_uuid());
        push_scope(&mut qb, scope);

        let row = qb
            .build_query_as::<PrayerRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("get_prayer_request", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip_all, fields(id = %request.id, tenant_id = ?request.tenant_id), err)]
    async fn insert(&self, request: PrayerRequest) -> StoreResult<PrayerRequest> {
        sqlx::query(
            r#"
            INSERT INTO prayer_requests (id, tenant_id, author_id, name, request, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(opt_uuid(request.tenant_id))
        .bind(request.author_id.as_uuid())
        .bind(&request.name)
        .bind(&request.request)
        .bind(request.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_prayer_request", e))?;
        Ok(request)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM prayer_requests WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_prayer_request", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LiveStreamRepository for PostgresStore {
    #[instrument(skip(self), fields(tenant_id = %tenant_id), err)]
    async fn get(&self, tenant_id: TenantId) -> StoreResult<Option<LiveStreamConfig>> {
        let row = sqlx::query_as::<_, LiveStreamRow>(&format!(
            "SELECT {LIVE_STREAM_COLUMNS} FROM live_streams WHERE tenant_id = $1"
        ))
        .bind(tenant_id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("get_live_stream", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip_all, fields(tenant_id = %config.tenant_id), err)]
    async fn upsert(&self, config: LiveStreamConfig) -> StoreResult<LiveStreamConfig> {
        sqlx::query(
            r#"
            INSERT INTO live_streams (tenant_id, stream_url, is_live, title, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id) DO UPDATE SET
                stream_url = EXCLUDED.stream_url,
                is_live = EXCLUDED.is_live,
                title = EXCLUDED.title,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            "#,
        )
        .bind(config.tenant_id.as_uuid())
        .bind(&config.stream_url)
        .bind(config.is_live)
        .bind(&config.title)
        .bind(config.updated_at)
        .bind(opt_uuid(config.updated_by))
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("upsert_live_stream", e))?;
        Ok(config)
    }
}
