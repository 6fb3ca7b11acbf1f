//! Login, logout, self-registration and email verification.
//!
//! Login is the only handler that issues a session cookie; logout clears it
//! unconditionally so it is safe to call without a session.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use chapel_auth::{require_session, LoginInput, RegisterInput};

use crate::app::dto::VerifyQuery;
use crate::app::errors::{self, ApiResult};
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::SessionContext;
use crate::cookie;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/register", post(register))
        .route("/verify", get(verify))
        .route("/me", get(me))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(input): ApiJson<LoginInput>,
) -> axum::response::Response {
    let out = match services.auth.login(input).await {
        Ok(out) => out,
        Err(e) => return errors::login_error_to_response(e),
    };

    let set_cookie = cookie::session_cookie(services.auth_config(), &out.token);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, set_cookie)],
        Json(json!({ "success": true, "user": out.session })),
    )
        .into_response()
}

/// POST /api/auth/logout
pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let set_cookie = cookie::clear_session_cookie(services.auth_config());
    (
        StatusCode::OK,
        [(header::SET_COOKIE, set_cookie)],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// POST /api/auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> ApiResult {
    let out = services.auth.register(input).await?;

    // No mail transport: the link goes to the operator log.
    tracing::info!(
        user_id = %out.identity.id,
        link = %format!("{}/api/auth/verify?token={}", services.base_url, out.verification_token),
        "verification link issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "registration received; verify your email address to continue",
        })),
    )
        .into_response())
}

/// GET /api/auth/verify?token=...
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<VerifyQuery>,
) -> ApiResult {
    services.auth.verify_email(query.token.as_deref().unwrap_or_default()).await?;
    Ok(Json(json!({ "success": true, "message": "email verified" })).into_response())
}

/// GET /api/auth/me
pub async fn me(Extension(ctx): Extension<SessionContext>) -> ApiResult {
    let session = require_session(ctx.session())?;
    Ok(Json(json!({ "success": true, "user": session })).into_response())
}
