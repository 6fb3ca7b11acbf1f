//! Account and tenant workflows built on the guards.
//!
//! `AuthService` is transport-agnostic: handlers pass in the already resolved
//! [`Session`] and get domain results back.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Deserialize;
use thiserror::Error;

use chapel_core::{DomainError, DomainResult, StoreError, TenantId, UserId};

use crate::authorize::{can_mutate_identity, ensure_can_delete_identity, require_role, AuthzError};
use crate::identity::{normalize_name, validate_email, validate_password};
use crate::password::{hash_password, verify_against_dummy, verify_password};
use crate::store::{IdentityRepository, TenantRepository};
use crate::tenant::validate_slug;
use crate::token::IssuedToken;
use crate::{AuthConfig, Identity, IdentityPatch, Role, Session, SessionManager, Tenant, TenantSummary};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub tenant_id: Option<TenantId>,
}

#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub identity: Identity,
    pub session: Session,
    pub token: IssuedToken,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("email and password are required")]
    MissingFields,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    TenantAssignment(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<StoreError> for LoginError {
    fn from(value: StoreError) -> Self {
        LoginError::Domain(value.into())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub tenant_id: Option<TenantId>,
}

#[derive(Debug, Clone)]
pub struct RegisterOutput {
    pub identity: Identity,
    /// One-time token for the verification link.
    pub verification_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdentityInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    pub tenant_id: Option<TenantId>,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTenantInput {
    pub slug: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityRepository>,
    tenants: Arc<dyn TenantRepository>,
    sessions: SessionManager,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        tenants: Arc<dyn TenantRepository>,
        sessions: SessionManager,
        config: AuthConfig,
    ) -> Self {
        Self { identities, tenants, sessions, config }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn login(&self, input: LoginInput) -> Result<LoginOutput, LoginError> {
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(LoginError::MissingFields);
        }

        let Some(identity) = self.identities.find_by_email(email).await? else {
            verify_against_dummy(&input.password);
            tracing::info!("login rejected: unknown email");
            return Err(LoginError::InvalidCredentials);
        };
        if !verify_password(&input.password, &identity.password_hash) {
            tracing::info!(user_id = %identity.id, "login rejected: bad password");
            return Err(LoginError::InvalidCredentials);
        }

        if identity.lacks_required_tenant() {
            tracing::warn!(user_id = %identity.id, "login rejected: no tenant assigned");
            return Err(LoginError::TenantAssignment(
                "no church is assigned to this account".to_string(),
            ));
        }
        if let Some(requested) = input.tenant_id {
            if !identity.is_super_admin() && identity.tenant_id != Some(requested) {
                tracing::warn!(user_id = %identity.id, %requested, "login rejected: tenant mismatch");
                return Err(LoginError::TenantAssignment(
                    "this account does not belong to the selected church".to_string(),
                ));
            }
        }

        let tenant = match identity.tenant_id {
            Some(tenant_id) => self.tenants.find_by_id(tenant_id).await?.map(|t| t.summary()),
            None => None,
        };
        let token = self.sessions.issue(&identity)?;
        let session = Session::from_identity(&identity, tenant);

        tracing::info!(user_id = %identity.id, role = %identity.role, tenant_id = ?identity.tenant_id, "login succeeded");
        Ok(LoginOutput { identity, session, token })
    }

    /// Self-service sign-up. Creates an unverified `USER` in an existing tenant.
    pub async fn register(&self, input: RegisterInput) -> DomainResult<RegisterOutput> {
        let name = normalize_name(Some(&input.name))
            .ok_or_else(|| DomainError::validation("name is required"))?;
        let email = validate_email(&input.email)?;
        validate_password(&input.password, self.config.min_password_length)?;

        let tenant_id = input
            .tenant_id
            .ok_or_else(|| DomainError::validation("a church must be selected"))?;
        self.ensure_tenant_exists(tenant_id).await?;

        let password_hash = hash_password(&input.password).map_err(|e| DomainError::internal(e.to_string()))?;
        let verification_token = new_verification_token();

        let mut identity = Identity::new(email, password_hash, Some(name), Role::User, Some(tenant_id), Utc::now());
        identity.verification_token = Some(verification_token.clone());

        let identity = self.identities.insert(identity).await?;
        tracing::info!(user_id = %identity.id, %tenant_id, "registered new identity");
        Ok(RegisterOutput { identity, verification_token })
    }

    /// Consume a verification token. Tokens are single use.
    pub async fn verify_email(&self, token: &str) -> DomainResult<Identity> {
        let token = token.trim();
        let invalid = || DomainError::validation("invalid or expired verification token");
        if token.is_empty() {
            return Err(invalid());
        }

        let mut identity = self.identities.find_by_verification_token(token).await?.ok_or_else(invalid)?;
        identity.is_verified = true;
        identity.verification_token = None;
        identity.updated_at = Utc::now();

        let identity = self.identities.update(identity).await?.ok_or(DomainError::NotFound)?;
        tracing::info!(user_id = %identity.id, "email verified");
        Ok(identity)
    }

    /// Privileged creation through the admin path.
    pub async fn create_identity(&self, session: &Session, input: NewIdentityInput) -> DomainResult<Identity> {
        require_role(session, Role::ChurchAdmin)?;

        let (role, tenant_id) = if session.is_super_admin() {
            (input.role, input.tenant_id)
        } else {
            if input.role == Role::SuperAdmin {
                return Err(AuthzError::RoleElevation.into());
            }
            // Church admins always create inside their own tenant.
            (input.role, Some(session.tenant_id.ok_or(AuthzError::NoTenant)?))
        };

        if role != Role::SuperAdmin && tenant_id.is_none() {
            return Err(DomainError::validation("a church is required for this role"));
        }
        if let Some(tenant_id) = tenant_id {
            self.ensure_tenant_exists(tenant_id).await?;
        }

        let email = validate_email(&input.email)?;
        validate_password(&input.password, self.config.min_password_length)?;
        let password_hash = hash_password(&input.password).map_err(|e| DomainError::internal(e.to_string()))?;

        let mut identity = Identity::new(
            email,
            password_hash,
            normalize_name(input.name.as_deref()),
            role,
            tenant_id,
            Utc::now(),
        );
        identity.is_verified = true;

        let identity = self.identities.insert(identity).await?;
        tracing::info!(created_by = %session.user_id, user_id = %identity.id, role = %identity.role, "identity created");
        Ok(identity)
    }

    pub async fn update_identity(&self, session: &Session, id: UserId, patch: IdentityPatch) -> DomainResult<Identity> {
        require_role(session, Role::ChurchAdmin)?;
        let target = self.visible_identity(session, id).await?;

        can_mutate_identity(session, &target, &patch).into_result().inspect_err(|reason| {
            tracing::warn!(user_id = %session.user_id, target = %target.id, %reason, "identity update denied");
        })?;

        if target.is_super_admin() && patch.changes_role(&target) {
            self.ensure_not_last_super_admin("demote").await?;
        }

        let mut updated = target.clone();
        if let Some(name) = &patch.name {
            updated.name = normalize_name(Some(name));
        }
        if let Some(role) = patch.role {
            updated.role = role;
        }
        if let Some(tenant_id) = patch.tenant_id {
            updated.tenant_id = tenant_id;
        }
        if let Some(password) = &patch.password {
            validate_password(password, self.config.min_password_length)?;
            updated.password_hash = hash_password(password).map_err(|e| DomainError::internal(e.to_string()))?;
        }

        if updated.lacks_required_tenant() {
            return Err(DomainError::validation("a church is required for this role"));
        }
        if let Some(tenant_id) = updated.tenant_id.filter(|_| patch.changes_tenant(&target)) {
            self.ensure_tenant_exists(tenant_id).await?;
        }

        updated.updated_at = Utc::now();
        let updated = self.identities.update(updated).await?.ok_or(DomainError::NotFound)?;
        tracing::info!(updated_by = %session.user_id, user_id = %updated.id, "identity updated");
        Ok(updated)
    }

    /// Identities outside a church admin's tenant are reported as missing,
    /// the same as an unknown id.
    pub async fn delete_identity(&self, session: &Session, id: UserId) -> DomainResult<()> {
        require_role(session, Role::ChurchAdmin)?;
        let target = self.visible_identity(session, id).await?;
        ensure_can_delete_identity(session, &target)?;

        if target.is_super_admin() {
            self.ensure_not_last_super_admin("delete").await?;
        }

        if !self.identities.delete(id).await? {
            return Err(DomainError::NotFound);
        }
        tracing::info!(deleted_by = %session.user_id, user_id = %id, "identity deleted");
        Ok(())
    }

    /// Church admins see their own tenant; superadmins see all or the requested tenant.
    pub async fn list_identities(&self, session: &Session, tenant: Option<TenantId>) -> DomainResult<Vec<Identity>> {
        require_role(session, Role::ChurchAdmin)?;
        let filter = if session.is_super_admin() {
            tenant
        } else {
            Some(session.tenant_id.ok_or(AuthzError::NoTenant)?)
        };
        Ok(self.identities.list(filter).await?)
    }

    /// Create a tenant together with its first church admin, all or nothing.
    pub async fn create_tenant_with_admin(
        &self,
        session: &Session,
        input: NewTenantInput,
    ) -> DomainResult<(Tenant, Identity)> {
        require_role(session, Role::SuperAdmin)?;

        let slug = validate_slug(&input.slug)?;
        let name = normalize_name(Some(&input.name)).ok_or_else(|| DomainError::validation("name is required"))?;
        let admin_email = validate_email(&input.admin_email)?;
        validate_password(&input.admin_password, self.config.min_password_length)?;
        let contact_email = match normalize_name(input.contact_email.as_deref()) {
            Some(email) => Some(validate_email(&email)?),
            None => None,
        };

        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::new(),
            slug,
            name,
            contact_email,
            contact_phone: normalize_name(input.contact_phone.as_deref()),
            address: normalize_name(input.address.as_deref()),
            created_at: now,
            updated_at: now,
        };

        let password_hash =
            hash_password(&input.admin_password).map_err(|e| DomainError::internal(e.to_string()))?;
        let mut admin = Identity::new(
            admin_email,
            password_hash,
            normalize_name(input.admin_name.as_deref()),
            Role::ChurchAdmin,
            Some(tenant.id),
            now,
        );
        admin.is_verified = true;

        let (tenant, admin) = self.tenants.create_with_admin(tenant, admin).await?;
        tracing::info!(created_by = %session.user_id, tenant_id = %tenant.id, slug = %tenant.slug, "tenant created");
        Ok((tenant, admin))
    }

    pub async fn list_tenants(&self, session: &Session) -> DomainResult<Vec<Tenant>> {
        require_role(session, Role::SuperAdmin)?;
        Ok(self.tenants.list().await?)
    }

    /// Public church directory offered on the registration form.
    pub async fn tenant_directory(&self) -> DomainResult<Vec<TenantSummary>> {
        let tenants = self.tenants.list().await?;
        Ok(tenants.iter().map(Tenant::summary).collect())
    }

    /// Seed a superadmin if no identity with `email` exists yet.
    ///
    /// Returns the created identity, or `None` when one was already present.
    pub async fn bootstrap_superadmin(&self, email: &str, password: &str) -> DomainResult<Option<Identity>> {
        let email = validate_email(email)?;
        if self.identities.find_by_email(&email).await?.is_some() {
            tracing::info!("bootstrap superadmin already present");
            return Ok(None);
        }
        validate_password(password, self.config.min_password_length)?;

        let password_hash = hash_password(password).map_err(|e| DomainError::internal(e.to_string()))?;
        let mut identity = Identity::new(email, password_hash, None, Role::SuperAdmin, None, Utc::now());
        identity.is_verified = true;

        let identity = self.identities.insert(identity).await?;
        tracing::info!(user_id = %identity.id, "bootstrap superadmin created");
        Ok(Some(identity))
    }

    /// Load an identity the session may see; anything outside a church admin's
    /// tenant is reported as missing.
    async fn visible_identity(&self, session: &Session, id: UserId) -> DomainResult<Identity> {
        let target = self.identities.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        if !session.is_super_admin() && target.tenant_id != session.tenant_id {
            return Err(DomainError::NotFound);
        }
        Ok(target)
    }

    async fn ensure_tenant_exists(&self, tenant_id: TenantId) -> DomainResult<()> {
        match self.tenants.find_by_id(tenant_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation("unknown church")),
        }
    }

    async fn ensure_not_last_super_admin(&self, action: &str) -> DomainResult<()> {
        if self.identities.count_by_role(Role::SuperAdmin).await? <= 1 {
            return Err(DomainError::conflict(format!("cannot {action} the last SUPERADMIN")));
        }
        Ok(())
    }
}

/// 32 random bytes, hex encoded.
fn new_verification_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
