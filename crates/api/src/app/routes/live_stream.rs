use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use chapel_auth::require_session;
use chapel_content::LiveStreamUpdate;
use chapel_core::DomainError;

use crate::app::dto::TenantFilterQuery;
use crate::app::errors::ApiResult;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/", get(get_config).put(put_config))
}

/// GET /api/live-stream?tenantId=...
///
/// Public read. Without `tenantId` the caller's own tenant is used.
pub async fn get_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<TenantFilterQuery>,
) -> ApiResult {
    let tenant_id = query
        .tenant_id()?
        .or_else(|| ctx.session().and_then(|s| s.tenant_id))
        .ok_or_else(|| DomainError::validation("tenantId is required"))?;

    let config = services.content.live_stream(tenant_id).await?;
    Ok(Json(json!({ "success": true, "liveStream": config })).into_response())
}

/// PUT /api/live-stream
pub async fn put_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    ApiJson(update): ApiJson<LiveStreamUpdate>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let config = services.content.set_live_stream(session, update).await?;
    Ok(Json(json!({ "success": true, "liveStream": config })).into_response())
}
