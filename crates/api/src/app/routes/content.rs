//! Sections, notifications and schedules.
//!
//! The three kinds share one set of handlers; the nested router for each kind
//! carries its [`ContentKind`] as an extension.

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
use chapel_content::{ContentKind, ContentPatch, NewContent};
use chapel_core::ContentId;

use crate::app::errors::ApiResult;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router(kind: ContentKind) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .layer(Extension(kind))
}

/// GET /api/{kind}. Anonymous callers see public records only.
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Extension(kind): Extension<ContentKind>,
) -> ApiResult {
    let items = services.content.list(ctx.session(), kind).await?;
    Ok(Json(json!({ "success": true, "items": items })).into_response())
}

/// POST /api/{kind}
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Extension(kind): Extension<ContentKind>,
    ApiJson(input): ApiJson<NewContent>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let item = services.content.create(session, kind, input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "item": item }))).into_response())
}

/// GET /api/{kind}/:id
pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Extension(kind): Extension<ContentKind>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ContentId = id.parse()?;
    let item = services.content.get(ctx.session(), kind, id).await?;
    Ok(Json(json!({ "success": true, "item": item })).into_response())
}

/// PATCH /api/{kind}/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Extension(kind): Extension<ContentKind>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ContentPatch>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let id: ContentId = id.parse()?;
    let item = services.content.update(session, kind, id, patch).await?;
    Ok(Json(json!({ "success": true, "item": item })).into_response())
}

/// DELETE /api/{kind}/:id
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Extension(kind): Extension<ContentKind>,
    Path(id): Path<String>,
) -> ApiResult {
    let session = require_session(ctx.session())?;
    let id: ContentId = id.parse()?;
    services.content.delete(session, kind, id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}
