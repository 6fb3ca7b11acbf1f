use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use chapel_auth::{require_session, NewTenantInput};

use crate::app::dto::{TenantCreated, UserView};
use crate::app::errors::ApiResult;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/tenants", get(list_tenants).post(create_tenant))
}

/// GET /api/superadmin/tenants
pub async fn list_tenants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let tenants = services.auth.list_tenants(session).await?;
    Ok(Json(json!({ "success": true, "tenants": tenants })).into_response())
}

/// POST /api/superadmin/tenants
///
/// Creates the tenant together with its first CHURCH_ADMIN.
pub async fn create_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    ApiJson(input): ApiJson<NewTenantInput>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let (tenant, admin) = services.auth.create_tenant_with_admin(session, input).await?;
    let body = TenantCreated { success: true, tenant: &tenant, admin: UserView::from(&admin) };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}
