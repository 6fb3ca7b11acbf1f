//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation(<constraint>)` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Other | N/A | `Backend` |
//!
//! ## Tenant Scoping
//!
//! Every tenant-aware read appends the predicate produced by [`push_scope`],
//! so the same `TenantScope` drives both this adapter and the in-memory one.

mod content;
mod identities;
mod rows;
mod tenants;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use chapel_auth::TenantScope;
use chapel_core::{StoreError, StoreResult};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[tracing::instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Append `AND <tenant predicate>` for `scope` to a query that already has a
/// `WHERE` clause.
pub(crate) fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &TenantScope) {
    match scope {
        TenantScope::Unrestricted => {}
        TenantScope::PublicOnly => {
            qb.push(" AND tenant_id IS NULL");
        }
        TenantScope::Only(tenant_id) => {
            qb.push(" AND tenant_id = ").push_bind(*tenant_id.as_uuid());
        }
        TenantScope::TenantAndPublic(tenant_id) => {
            qb.push(" AND (tenant_id = ")
                .push_bind(*tenant_id.as_uuid())
                .push(" OR tenant_id IS NULL)");
        }
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let what = match db_err.constraint() {
                    Some(c) if c.contains("email") => "email",
                    Some(c) if c.contains("slug") => "slug",
                    Some(c) if c.contains("verification_token") => "verification token",
                    _ => "record",
                };
                StoreError::UniqueViolation(what.to_string())
            } else {
                tracing::error!(operation, error = %db_err, "database error");
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => {
            tracing::error!(operation, error = %other, "storage failure");
            StoreError::Backend(format!("{operation}: {other}"))
        }
    }
}
