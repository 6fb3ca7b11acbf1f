//! Page routes.
//!
//! Each page returns the JSON model a renderer would need. The edge gate has
//! already filtered on the token alone; the handlers here repeat the check
//! against the session resolved from storage and redirect on failure.

use std::sync::Arc;

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use chapel_auth::{require_role, require_session, Role};
use chapel_content::ContentKind;
use chapel_core::{DomainError, DomainResult};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::SessionContext;

const LOGIN: &str = "/login";
const SUPERADMIN_LOGIN: &str = "/superadmin/login";

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/register", get(register))
        .route("/superadmin/login", get(superadmin_login))
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .route("/superadmin", get(superadmin))
}

fn render(
    result: DomainResult<Value>,
    services: &AppServices,
    ctx: &SessionContext,
    login_path: &'static str,
) -> Response {
    match result {
        Ok(model) => Json(model).into_response(),
        Err(err) => errors::page_error_to_response(err, ctx.session(), login_path, services.auth_config()),
    }
}

pub async fn home(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let result = async {
        let notifications = services.content.list(None, ContentKind::Notification).await?;
        Ok::<_, DomainError>(json!({ "page": "home", "notifications": notifications }))
    }
    .await;
    render(result, &services, &ctx, LOGIN)
}

pub async fn login() -> Response {
    Json(json!({ "page": "login" })).into_response()
}

pub async fn superadmin_login() -> Response {
    Json(json!({ "page": "superadmin_login" })).into_response()
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let result = async {
        let churches = services.auth.tenant_directory().await?;
        Ok::<_, DomainError>(json!({ "page": "register", "churches": churches }))
    }
    .await;
    render(result, &services, &ctx, LOGIN)
}

/// Any signed-in role. A member without a church still lands here and is
/// told so instead of being redirected.
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let result = async {
        let session = require_session(ctx.session())?;
        let no_tenant = !session.is_super_admin() && session.tenant_id.is_none();

        let notifications = services.content.list(Some(session), ContentKind::Notification).await?;
        let schedules = services.content.list(Some(session), ContentKind::Schedule).await?;
        let live_stream = match session.tenant_id {
            Some(tenant_id) => services.content.live_stream(tenant_id).await?,
            None => None,
        };

        Ok::<_, DomainError>(json!({
            "page": "dashboard",
            "user": session,
            "noTenant": no_tenant,
            "notifications": notifications,
            "schedules": schedules,
            "liveStream": live_stream,
        }))
    }
    .await;
    render(result, &services, &ctx, LOGIN)
}

pub async fn admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let result = async {
        let session = require_session(ctx.session())?;
        require_role(session, Role::ChurchAdmin)?;

        let users = services.auth.list_identities(session, None).await?;
        let sections = services.content.list(Some(session), ContentKind::Section).await?;
        Ok::<_, DomainError>(json!({
            "page": "admin",
            "user": session,
            "users": crate::app::dto::users_to_views(&users),
            "sections": sections,
        }))
    }
    .await;
    render(result, &services, &ctx, LOGIN)
}

pub async fn superadmin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> Response {
    let result = async {
        let session = require_session(ctx.session())?;
        require_role(session, Role::SuperAdmin)?;

        let tenants = services.auth.list_tenants(session).await?;
        Ok::<_, DomainError>(json!({ "page": "superadmin", "user": session, "tenants": tenants }))
    }
    .await;
    render(result, &services, &ctx, SUPERADMIN_LOGIN)
}
