//! Row decoding.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use chapel_auth::{Identity, Role, Tenant};
use chapel_content::{ContentKind, ContentRecord, LiveStreamConfig, PrayerRequest};
use chapel_core::{ContentId, TenantId, UserId};

pub(crate) const IDENTITY_COLUMNS: &str =
    "id, email, password_hash, name, role, tenant_id, is_verified, verification_token, created_at, updated_at";

pub(crate) const TENANT_COLUMNS: &str =
    "id, slug, name, contact_email, contact_phone, address, created_at, updated_at";

pub(crate) const CONTENT_COLUMNS: &str =
    "id, kind, tenant_id, title, body, scheduled_for, created_by, created_at, updated_at";

pub(crate) const PRAYER_COLUMNS: &str = "id, tenant_id, author_id, name, request, created_at";

pub(crate) const LIVE_STREAM_COLUMNS: &str = "tenant_id, stream_url, is_live, title, updated_at, updated_by";

fn decode_err(column: &str, e: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) }
}

pub(crate) struct IdentityRow(pub Identity);

impl<'r> FromRow<'r, PgRow> for IdentityRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let role: Role = role.parse().map_err(|e| decode_err("role", e))?;
        Ok(IdentityRow(Identity {
            id: UserId::from_uuid(row.try_get("id")?),
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            name: row.try_get("name")?,
            role,
            tenant_id: row.try_get::<Option<Uuid>, _>("tenant_id")?.map(TenantId::from_uuid),
            is_verified: row.try_get("is_verified")?,
            verification_token: row.try_get("verification_token")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

pub(crate) struct TenantRow(pub Tenant);

impl<'r> FromRow<'r, PgRow> for TenantRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TenantRow(Tenant {
            id: TenantId::from_uuid(row.try_get("id")?),
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            contact_email: row.try_get("contact_email")?,
            contact_phone: row.try_get("contact_phone")?,
            address: row.try_get("address")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

pub(crate) struct ContentRow(pub ContentRecord);

impl<'r> FromRow<'r, PgRow> for ContentRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind: ContentKind = kind.parse().map_err(|e| decode_err("kind", e))?;
        Ok(ContentRow(ContentRecord {
            id: ContentId::from_uuid(row.try_get("id")?),
            kind,
            tenant_id: row.try_get::<Option<Uuid>, _>("tenant_id")?.map(TenantId::from_uuid),
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            scheduled_for: row.try_get("scheduled_for")?,
            created_by: row.try_get::<Option<Uuid>, _>("created_by")?.map(UserId::from_uuid),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

pub(crate) struct PrayerRow(pub PrayerRequest);

impl<'r> FromRow<'r, PgRow> for PrayerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PrayerRow(PrayerRequest {
            id: ContentId::from_uuid(row.try_get("id")?),
            tenant_id: row.try_get::<Option<Uuid>, _>("tenant_id")?.map(TenantId::from_uuid),
            author_id: UserId::from_uuid(row.try_get("author_id")?),
            name: row.try_get("name")?,
            request: row.try_get("request")?,
            created_at: row.try_get("created_at")?,
        }))
    }
}

pub(crate) struct LiveStreamRow(pub LiveStreamConfig);

impl<'r> FromRow<'r, PgRow> for LiveStreamRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LiveStreamRow(LiveStreamConfig {
            tenant_id: TenantId::from_uuid(row.try_get("tenant_id")?),
            stream_url: row.try_get("stream_url")?,
            is_live: row.try_get("is_live")?,
            title: row.try_get("title")?,
            updated_at: row.try_get("updated_at")?,
            updated_by: row.try_get::<Option<Uuid>, _>("updated_by")?.map(UserId::from_uuid),
        }))
    }
}

pub(crate) fn opt_uuid<T: Into<Uuid>>(id: Option<T>) -> Option<Uuid> {
    id.map(Into::into)
}
