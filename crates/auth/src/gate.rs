//! Edge request gate.
//!
//! Runs before any page handler and decides routing from the token alone
//! (signature and expiry, no database read). It only redirects; the
//! authoritative check is [`crate::SessionManager::resolve_current`] inside
//! the page.

use std::sync::Arc;

use crate::token::TokenCodec;
use crate::Role;

/// What the edge knows about the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateState {
    NoToken,
    InvalidToken,
    ValidSuperAdmin,
    ValidChurchAdmin,
    ValidUser,
}

impl GateState {
    pub fn from_role(role: Role) -> Self {
        match role {
            Role::SuperAdmin => GateState::ValidSuperAdmin,
            Role::ChurchAdmin => GateState::ValidChurchAdmin,
            Role::User => GateState::ValidUser,
        }
    }

    pub fn role(self) -> Option<Role> {
        match self {
            GateState::ValidSuperAdmin => Some(Role::SuperAdmin),
            GateState::ValidChurchAdmin => Some(Role::ChurchAdmin),
            GateState::ValidUser => Some(Role::User),
            GateState::NoToken | GateState::InvalidToken => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    /// `/`
    Home,
    /// `/login`, `/register`, `/superadmin/login`
    LoginOnly,
    /// `/dashboard/**`
    Dashboard,
    /// `/admin/**`
    Admin,
    /// `/superadmin/**` except its login page
    SuperAdmin,
}

/// Classify a request path. Matching is by whole path segments.
pub fn classify(path: &str) -> RouteClass {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (None, _) => RouteClass::Home,
        (Some("login" | "register"), None) => RouteClass::LoginOnly,
        (Some("superadmin"), Some("login")) if segments.next().is_none() => RouteClass::LoginOnly,
        (Some("superadmin"), _) => RouteClass::SuperAdmin,
        (Some("admin"), _) => RouteClass::Admin,
        (Some("dashboard"), _) => RouteClass::Dashboard,
        _ => RouteClass::Public,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(&'static str),
}

/// Routing rules, evaluated without touching storage.
pub fn decide(state: GateState, route: RouteClass) -> GateDecision {
    let role = state.role();
    match (route, role) {
        (RouteClass::Public, _) => GateDecision::Continue,

        (RouteClass::Home, Some(role)) => GateDecision::Redirect(role.home_path()),
        (RouteClass::Home, None) => GateDecision::Continue,

        (RouteClass::LoginOnly, Some(role)) => GateDecision::Redirect(role.home_path()),
        (RouteClass::LoginOnly, None) => GateDecision::Continue,

        (RouteClass::SuperAdmin, None) => GateDecision::Redirect("/superadmin/login"),
        (RouteClass::SuperAdmin, Some(Role::SuperAdmin)) => GateDecision::Continue,
        (RouteClass::SuperAdmin, Some(role)) => GateDecision::Redirect(role.home_path()),

        (RouteClass::Admin | RouteClass::Dashboard, None) => GateDecision::Redirect("/login"),
        (RouteClass::Admin, Some(Role::User)) => GateDecision::Redirect("/dashboard"),
        (RouteClass::Admin | RouteClass::Dashboard, Some(_)) => GateDecision::Continue,
    }
}

/// Token-only gate bound to the signing key.
#[derive(Debug, Clone)]
pub struct EdgeGate {
    codec: Arc<TokenCodec>,
}

impl EdgeGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn state_for(&self, token: Option<&str>) -> GateState {
        match token.filter(|t| !t.is_empty()) {
            None => GateState::NoToken,
            Some(token) => match self.codec.verify(token) {
                Ok(claims) => GateState::from_role(claims.role),
                Err(e) => {
                    tracing::debug!(reason = %e, "edge gate saw an invalid token");
                    GateState::InvalidToken
                }
            },
        }
    }

    pub fn evaluate(&self, path: &str, token: Option<&str>) -> GateDecision {
        decide(self.state_for(token), classify(path))
    }
}
