use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use chapel_auth::require_session;
use chapel_content::NewPrayerRequest;
use chapel_core::ContentId;

use crate::app::errors::ApiResult;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).delete(remove))
}

/// GET /api/prayer-requests
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult {
    let requests = services.content.list_prayer_requests(ctx.session()).await?;
    Ok(Json(json!({ "success": true, "prayerRequests": requests })).into_response())
}

/// POST /api/prayer-requests
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    ApiJson(input): ApiJson<NewPrayerRequest>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let request = services.content.create_prayer_request(session, input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "prayerRequest": request }))).into_response())
}

/// GET /api/prayer-requests/:id
pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ContentId = id.parse()?;
    let request = services.content.get_prayer_request(ctx.session(), id).await?;
    Ok(Json(json!({ "success": true, "prayerRequest": request })).into_response())
}

/// DELETE /api/prayer-requests/:id
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let id: ContentId = id.parse()?;
    services.content.delete_prayer_request(session, id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}
