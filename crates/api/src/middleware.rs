use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use chapel_auth::GateDecision;

use crate::app::services::AppServices;
use crate::context::SessionContext;
use crate::cookie::read_session_token;

/// Token-only check in front of every route. Only page routes can redirect;
/// API paths always continue to their handlers.
pub async fn edge_gate(State(services): State<Arc<AppServices>>, req: Request<Body>, next: Next) -> Response {
    let token = read_session_token(req.headers(), &services.auth_config().cookie_name);
    let decision = services.gate.evaluate(req.uri().path(), token);

    match decision {
        GateDecision::Continue => next.run(req).await,
        GateDecision::Redirect(location) => {
            tracing::debug!(path = %req.uri().path(), location, "edge gate redirect");
            Redirect::temporary(location).into_response()
        }
    }
}

/// Resolve the session against storage and attach it as [`SessionContext`].
///
/// A storage failure degrades to an anonymous request.
pub async fn session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = read_session_token(req.headers(), &services.auth_config().cookie_name).map(str::to_owned);

    let session = match services.auth.sessions().resolve_current(token.as_deref()).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(error = %err, "session resolution failed");
            None
        }
    };

    req.extensions_mut().insert(SessionContext::new(session));
    next.run(req).await
}
