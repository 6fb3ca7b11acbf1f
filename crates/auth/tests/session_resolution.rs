//! Session manager and auth service behaviour against mock repositories.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chapel_auth::{
    hash_password, AuthConfig, AuthService, IdentityPatch, LoginError, LoginInput, NewIdentityInput, RegisterInput,
    Role, Session, SessionManager, TokenCodec,
};
use chapel_core::{DomainError, TenantId};

use common::mock_repos::{MockIdentityRepository, MockTenantRepository};

const SECRET: &str = "test-secret-test-secret-test-secret!";

struct Harness {
    identities: MockIdentityRepository,
    tenants: MockTenantRepository,
    sessions: SessionManager,
    service: AuthService,
}

fn harness() -> Harness {
    let identities = MockIdentityRepository::new();
    let tenants = MockTenantRepository::new(identities.clone());
    let config = AuthConfig::new(SECRET);
    let codec = Arc::new(TokenCodec::new(SECRET.as_bytes(), Duration::from_secs(3600)).unwrap());
    let sessions = SessionManager::new(codec, Arc::new(identities.clone()), Arc::new(tenants.clone()));
    let service = AuthService::new(
        Arc::new(identities.clone()),
        Arc::new(tenants.clone()),
        sessions.clone(),
        config,
    );
    Harness { identities, tenants, sessions, service }
}

#[tokio::test]
async fn resolve_current_returns_none_without_token() {
    let h = harness();
    assert_eq!(h.sessions.resolve_current(None).await.unwrap(), None);
    assert_eq!(h.sessions.resolve_current(Some("")).await.unwrap(), None);
    assert_eq!(h.sessions.resolve_current(Some("garbage")).await.unwrap(), None);
}

#[tokio::test]
async fn resolve_current_rebuilds_from_database() {
    let h = harness();
    let tenant = MockTenantRepository::test_tenant("st-marys", "St Mary's");
    h.tenants.insert_tenant(tenant.clone());
    let mut ident = MockIdentityRepository::test_identity(Role::ChurchAdmin, Some(tenant.id));
    h.identities.insert_identity(ident.clone());

    let token = h.sessions.issue(&ident).unwrap().token;

    let session = h.sessions.resolve_current(Some(&token)).await.unwrap().unwrap();
    assert_eq!(session.user_id, ident.id);
    assert_eq!(session.role, Role::ChurchAdmin);
    assert_eq!(session.tenant.as_ref().map(|t| t.name.as_str()), Some("St Mary's"));

    // Role changes in storage win over what the token says.
    ident.role = Role::User;
    h.identities.insert_identity(ident.clone());
    let session = h.sessions.resolve_current(Some(&token)).await.unwrap().unwrap();
    assert_eq!(session.role, Role::User);
}

#[tokio::test]
async fn deleted_identity_has_no_session() {
    let h = harness();
    let ident = MockIdentityRepository::test_identity(Role::User, Some(TenantId::new()));
    h.identities.insert_identity(ident.clone());
    let token = h.sessions.issue(&ident).unwrap().token;

    use chapel_auth::IdentityRepository;
    assert!(h.identities.delete(ident.id).await.unwrap());
    assert_eq!(h.sessions.resolve_current(Some(&token)).await.unwrap(), None);
    assert_eq!(
        h.sessions.require_session(Some(&token)).await.unwrap_err(),
        DomainError::Unauthenticated
    );
}

#[tokio::test]
async fn require_role_rejects_lower_roles() {
    let h = harness();
    let ident = MockIdentityRepository::test_identity(Role::ChurchAdmin, Some(TenantId::new()));
    h.identities.insert_identity(ident.clone());
    let token = h.sessions.issue(&ident).unwrap().token;

    assert!(h.sessions.require_role(Some(&token), Role::User).await.is_ok());
    assert!(matches!(
        h.sessions.require_super_admin(Some(&token)).await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn login_maps_failures() {
    let h = harness();
    let tenant = MockTenantRepository::test_tenant("grace-chapel", "Grace Chapel");
    h.tenants.insert_tenant(tenant.clone());

    let mut ident = MockIdentityRepository::test_identity(Role::User, Some(tenant.id));
    ident.password_hash = hash_password("correct horse").unwrap();
    h.identities.insert_identity(ident.clone());

    let missing = h.service.login(LoginInput { email: ident.email.clone(), ..Default::default() }).await;
    assert_eq!(missing.unwrap_err(), LoginError::MissingFields);

    let wrong = h
        .service
        .login(LoginInput { email: ident.email.clone(), password: "wrong horse".into(), tenant_id: None })
        .await;
    assert_eq!(wrong.unwrap_err(), LoginError::InvalidCredentials);

    let unknown = h
        .service
        .login(LoginInput { email: "nobody@example.com".into(), password: "correct horse".into(), tenant_id: None })
        .await;
    assert_eq!(unknown.unwrap_err(), LoginError::InvalidCredentials);

    let other_tenant = h
        .service
        .login(LoginInput {
            email: ident.email.clone(),
            password: "correct horse".into(),
            tenant_id: Some(TenantId::new()),
        })
        .await;
    assert!(matches!(other_tenant.unwrap_err(), LoginError::TenantAssignment(_)));

    let ok = h
        .service
        .login(LoginInput { email: ident.email.clone(), password: "correct horse".into(), tenant_id: Some(tenant.id) })
        .await
        .unwrap();
    assert_eq!(ok.session.tenant.unwrap().id, tenant.id);
    let resolved = h.sessions.resolve_current(Some(&ok.token.token)).await.unwrap().unwrap();
    assert_eq!(resolved.user_id, ident.id);
}

#[tokio::test]
async fn login_without_tenant_is_rejected_for_members() {
    let h = harness();
    let mut ident = MockIdentityRepository::test_identity(Role::ChurchAdmin, None);
    ident.password_hash = hash_password("correct horse").unwrap();
    h.identities.insert_identity(ident.clone());

    let result = h
        .service
        .login(LoginInput { email: ident.email.clone(), password: "correct horse".into(), tenant_id: None })
        .await;
    assert!(matches!(result.unwrap_err(), LoginError::TenantAssignment(_)));
}

#[tokio::test]
async fn register_then_verify_is_single_use() {
    let h = harness();
    let tenant = MockTenantRepository::test_tenant("grace-chapel", "Grace Chapel");
    h.tenants.insert_tenant(tenant.clone());

    let out = h
        .service
        .register(RegisterInput {
            name: "New Member".into(),
            email: "member@example.com".into(),
            password: "password123".into(),
            tenant_id: Some(tenant.id),
        })
        .await
        .unwrap();
    assert!(!out.identity.is_verified);
    assert_eq!(out.identity.role, Role::User);

    let verified = h.service.verify_email(&out.verification_token).await.unwrap();
    assert!(verified.is_verified);
    assert!(verified.verification_token.is_none());

    assert!(matches!(
        h.service.verify_email(&out.verification_token).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn register_rejects_duplicates_and_unknown_tenants() {
    let h = harness();
    let tenant = MockTenantRepository::test_tenant("grace-chapel", "Grace Chapel");
    h.tenants.insert_tenant(tenant.clone());
    let input = RegisterInput {
        name: "Member".into(),
        email: "dup@example.com".into(),
        password: "password123".into(),
        tenant_id: Some(tenant.id),
    };

    h.service.register(input.clone()).await.unwrap();
    assert!(matches!(h.service.register(input.clone()).await, Err(DomainError::Conflict(_))));

    let unknown = RegisterInput { email: "other@example.com".into(), tenant_id: Some(TenantId::new()), ..input };
    assert!(matches!(h.service.register(unknown).await, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn church_admin_creates_inside_own_tenant_only() {
    let h = harness();
    let tenant = MockTenantRepository::test_tenant("st-marys", "St Mary's");
    h.tenants.insert_tenant(tenant.clone());
    let admin = MockIdentityRepository::test_identity(Role::ChurchAdmin, Some(tenant.id));
    h.identities.insert_identity(admin.clone());
    let session = Session::from_identity(&admin, Some(tenant.summary()));

    let created = h
        .service
        .create_identity(
            &session,
            NewIdentityInput {
                email: "member@example.com".into(),
                password: "password123".into(),
                name: None,
                role: Role::User,
                tenant_id: Some(TenantId::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.tenant_id, Some(tenant.id));
    assert!(created.is_verified);

    let elevated = h
        .service
        .create_identity(
            &session,
            NewIdentityInput {
                email: "boss@example.com".into(),
                password: "password123".into(),
                name: None,
                role: Role::SuperAdmin,
                tenant_id: None,
            },
        )
        .await;
    assert!(matches!(elevated, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn last_superadmin_is_protected() {
    let h = harness();
    let sa = MockIdentityRepository::test_identity(Role::SuperAdmin, None);
    h.identities.insert_identity(sa.clone());
    let session = Session::from_identity(&sa, None);

    let demote = IdentityPatch { role: Some(Role::ChurchAdmin), tenant_id: Some(Some(TenantId::new())), ..Default::default() };
    assert!(matches!(
        h.service.update_identity(&session, sa.id, demote).await,
        Err(DomainError::Conflict(_))
    ));

    let second = MockIdentityRepository::test_identity(Role::SuperAdmin, None);
    h.identities.insert_identity(second.clone());
    h.service.delete_identity(&session, second.id).await.unwrap();
    assert!(matches!(
        h.service.delete_identity(&session, sa.id).await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn tenant_directory_lists_names_only() {
    let h = harness();
    let tenant = MockTenantRepository::test_tenant("grace-chapel", "Grace Chapel");
    h.tenants.insert_tenant(tenant.clone());

    let directory = h.service.tenant_directory().await.unwrap();
    assert_eq!(directory, vec![tenant.summary()]);
}
