use async_trait::async_trait;
use tracing::instrument;

use chapel_auth::{Identity, IdentityRepository, Role};
use chapel_core::{StoreResult, TenantId, UserId};

use super::rows::{opt_uuid, IdentityRow, IDENTITY_COLUMNS};
use super::{map_sqlx_error, PostgresStore};

#[async_trait]
impl IdentityRepository for PostgresStore {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_identity_by_id", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip_all, err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = $1"))
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_identity_by_email", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip_all, err)]
    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE verification_token = $1"
        ))
        .bind(token)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_identity_by_verification_token", e))?;
        Ok(row.map(|r| r.0))
    }

    #[instrument(skip(self), fields(tenant_id = ?tenant), err)]
    async fn list(&self, tenant: Option<TenantId>) -> StoreResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities \
             WHERE ($1::uuid IS NULL OR tenant_id = $1) \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(opt_uuid(tenant))
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_identities", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    #[instrument(skip(self), err)]
    async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("count_identities_by_role", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip_all, fields(user_id = %identity.id, role = %identity.role), err)]
    async fn insert(&self, identity: Identity) -> StoreResult<Identity> {
        insert_identity(self.pool(), &identity)
            .await
            .map_err(|e| map_sqlx_error("insert_identity", e))?;
        Ok(identity)
    }

    #[instrument(skip_all, fields(user_id = %identity.id), err)]
    async fn update(&self, identity: Identity) -> StoreResult<Option<Identity>> {
        let result = sqlx::query(
            r#"
            UPDATE identities SET
                email = $2,
                password_hash = $3,
                name = $4,
                role = $5,
                tenant_id = $6,
                is_verified = $7,
                verification_token = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.name)
        .bind(identity.role.as_str())
        .bind(opt_uuid(identity.tenant_id))
        .bind(identity.is_verified)
        .bind(&identity.verification_token)
        .bind(identity.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_identity", e))?;

        Ok((result.rows_affected() > 0).then_some(identity))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_identity", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Shared by plain inserts and the tenant + admin transaction.
pub(super) async fn insert_identity<'e, E>(executor: E, identity: &Identity) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO identities (
            id, email, password_hash, name, role, tenant_id,
            is_verified, verification_token, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(identity.id.as_uuid())
    .bind(&identity.email)
    .bind(&identity.password_hash)
    .bind(&identity.name)
    .bind(identity.role.as_str())
    .bind(opt_uuid(identity.tenant_id))
    .bind(identity.is_verified)
    .bind(&identity.verification_token)
    .bind(identity.created_at)
    .bind(identity.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}
