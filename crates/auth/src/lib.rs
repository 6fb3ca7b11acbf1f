//! `chapel-auth`: authentication, sessions and tenant authorization.
//!
//! Decoupled from HTTP and storage: transports hand in raw tokens and receive
//! typed sessions and decisions; storage is reached through the traits in
//! [`store`].

pub mod authorize;
pub mod claims;
pub mod config;
pub mod gate;
pub mod identity;
pub mod password;
pub mod roles;
pub mod scope;
pub mod service;
pub mod session;
pub mod store;
pub mod tenant;
pub mod token;

pub use authorize::{
    can_delete_identity, can_mutate_identity, ensure_can_delete_identity, owns_resource, require_role,
    AuthzError, Decision,
};
pub use claims::{validate_claims, SessionClaims};
pub use config::{AuthConfig, SESSION_COOKIE_NAME};
pub use gate::{classify, decide, EdgeGate, GateDecision, GateState, RouteClass};
pub use identity::{Identity, IdentityPatch};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use scope::{filter_for, TenantScope};
pub use service::{
    AuthService, LoginError, LoginInput, LoginOutput, NewIdentityInput, NewTenantInput, RegisterInput,
    RegisterOutput,
};
pub use session::{require_session, Session, SessionManager};
pub use store::{IdentityRepository, TenantRepository};
pub use tenant::{Tenant, TenantSummary};
pub use token::{IssuedToken, TokenCodec, TokenError};
