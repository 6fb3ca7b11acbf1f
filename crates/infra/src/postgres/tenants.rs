use async_trait::async_trait;
use tracing::instrument;

use chapel_auth::{Identity, Tenant, TenantRepository};
use chapel_core::{StoreResult, TenantId};

use super::identities::insert_identity;
use super::rows::{TenantRow, TENANT_COLUMNS};
use super::{map_sqlx_error, PostgresStore};

#[async_trait]
impl TenantRepository for PostgresStore {
    #[instrument(skip(self), fields(tenant_id = %id), err)]
    async fn find_by_id(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_tenant_by_id", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip(self), err)]
    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_tenant_by_slug", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Tenant>> {
        let rows = sqlx::query_as::<_, TenantRow>(&format!("SELECT {TENANT_COLUMNS} FROM tenants ORDER BY name ASC"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_tenants", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Tenant and admin rows are written in one transaction. Any failure,
    /// including a unique violation on either row, rolls both back.
    #[instrument(skip_all, fields(tenant_id = %tenant.id, slug = %tenant.slug), err)]
    async fn create_with_admin(&self, tenant: Tenant, admin: Identity) -> StoreResult<(Tenant, Identity)> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO tenants (id, slug, name, contact_email, contact_phone, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(tenant.id.as_uuid())
        .bind(&tenant.slug)
        .bind(&tenant.name)
        .bind(&tenant.contact_email)
        .bind(&tenant.contact_phone)
        .bind(&tenant.address)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_tenant", e))?;

        insert_identity(&mut *tx, &admin)
            .await
            .map_err(|e| map_sqlx_error("insert_tenant_admin", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok((tenant, admin))
    }
}
