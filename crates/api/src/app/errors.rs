use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use chapel_auth::{AuthConfig, LoginError, Role, Session};
use chapel_core::DomainError;

use crate::cookie;

/// Handler error carrying a [`DomainError`]; renders as `{ success: false, error }`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        domain_error_to_response(self.0)
    }
}

pub type ApiResult = Result<Response, ApiError>;

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "authentication required"),
        DomainError::Forbidden(msg) => {
            tracing::warn!(reason = %msg, "request denied");
            json_error(StatusCode::FORBIDDEN, msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub fn login_error_to_response(err: LoginError) -> Response {
    match err {
        LoginError::MissingFields => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        LoginError::InvalidCredentials => json_error(StatusCode::UNAUTHORIZED, err.to_string()),
        LoginError::TenantAssignment(msg) => json_error(StatusCode::FORBIDDEN, msg),
        LoginError::Domain(e) => domain_error_to_response(e),
    }
}

/// Page-boundary mapping: guard failures become redirects, never error pages.
///
/// An unauthenticated redirect also clears the cookie, so a token whose
/// identity is gone cannot bounce between the edge gate and the login page.
pub fn page_error_to_response(
    err: DomainError,
    session: Option<&Session>,
    login_path: &'static str,
    config: &AuthConfig,
) -> Response {
    match err {
        DomainError::Unauthenticated => (
            [(header::SET_COOKIE, cookie::clear_session_cookie(config))],
            Redirect::temporary(login_path),
        )
            .into_response(),
        DomainError::Forbidden(reason) => {
            let home = session.map(|s| s.role).unwrap_or(Role::User).home_path();
            tracing::warn!(%reason, location = home, "page access denied");
            Redirect::temporary(home).into_response()
        }
        other => domain_error_to_response(other),
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}
