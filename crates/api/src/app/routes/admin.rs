//! Admin routes for identity management.
//!
//! Every handler goes through `AuthService`, which applies the tenant scope
//! and the escalation guards. A church admin only ever sees their own tenant.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;

use chapel_auth::{require_session, IdentityPatch, NewIdentityInput};
use chapel_core::UserId;

use crate::app::dto::{users_to_views, TenantFilterQuery, UserView};
use crate::app::errors::ApiResult;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", patch(update_user).delete(delete_user))
}

/// GET /api/admin/users?tenantId=...
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<TenantFilterQuery>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let identities = services.auth.list_identities(session, query.tenant_id()?).await?;
    Ok(Json(json!({ "success": true, "users": users_to_views(&identities) })).into_response())
}

/// POST /api/admin/users
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    ApiJson(input): ApiJson<NewIdentityInput>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let identity = services.auth.create_identity(session, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": UserView::from(&identity) })),
    )
        .into_response())
}

/// PATCH /api/admin/users/:id
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<IdentityPatch>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let id: UserId = id.parse()?;
    let identity = services.auth.update_identity(session, id, patch).await?;
    Ok(Json(json!({ "success": true, "user": UserView::from(&identity) })).into_response())
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let id: UserId = id.parse()?;
    services.auth.delete_identity(session, id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}
