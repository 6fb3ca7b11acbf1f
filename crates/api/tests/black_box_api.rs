use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

use chapel_api::config::Config;
use chapel_auth::{Role, SessionClaims};
use chapel_core::UserId;

const SECRET: &str = "black-box-session-secret-0123456789";
const ROOT_EMAIL: &str = "root@example.com";
const ROOT_PASSWORD: &str = "rootpassword";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, bound to an ephemeral port.
        let config = Config::in_memory(SECRET).with_bootstrap(ROOT_EMAIL, ROOT_PASSWORD);
        let app = chapel_api::app::build_app(&config).await.expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Redirects are assertions here, not something to follow.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self { base_url, client, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.unwrap()
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> reqwest::Response {
        let mut req = self.client.request(method, self.url(path)).json(&body);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.unwrap()
    }

    /// Log in and return the `name=value` pair to send back as a cookie.
    async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .send_json(reqwest::Method::POST, "/api/auth/login", None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(res.status(), StatusCode::OK, "login failed for {email}");
        session_pair(&res).expect("login did not set a session cookie")
    }

    async fn create_church(&self, root: &str, slug: &str) -> (String, String) {
        let admin_email = format!("admin@{slug}.org");
        let res = self
            .send_json(
                reqwest::Method::POST,
                "/api/superadmin/tenants",
                Some(root),
                json!({
                    "slug": slug,
                    "name": slug.replace('-', " "),
                    "adminEmail": admin_email,
                    "adminPassword": "adminpassword",
                    "adminName": "Church Admin",
                }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        let tenant_id = body["tenant"]["id"].as_str().unwrap().to_string();
        (tenant_id, admin_email)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn set_cookie(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

fn session_pair(res: &reqwest::Response) -> Option<String> {
    set_cookie(res).and_then(|c| c.split(';').next().map(str::to_string))
}

fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
}

fn mint(secret: &str, claims: &SessionClaims) -> String {
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode token");
    format!("ch_app_session={token}")
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    assert_eq!(srv.get("/health", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_sets_session_cookie_and_me_reads_it() {
    let srv = TestServer::spawn().await;

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": ROOT_EMAIL, "password": ROOT_PASSWORD }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = set_cookie(&res).unwrap();
    assert!(cookie.starts_with("ch_app_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));

    let pair = session_pair(&res).unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "SUPERADMIN");
    assert!(body["user"]["tenantId"].is_null());

    let me: Value = srv.get("/api/auth/me", Some(&pair)).await.json().await.unwrap();
    assert_eq!(me["user"]["email"], ROOT_EMAIL);
}

#[tokio::test]
async fn login_failures_use_documented_statuses() {
    let srv = TestServer::spawn().await;

    let res = srv
        .send_json(reqwest::Method::POST, "/api/auth/login", None, json!({ "email": ROOT_EMAIL }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": ROOT_EMAIL, "password": "wrong-password" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&res).is_none());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn me_without_session_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let res = srv.get("/api/auth/me", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_always_clears_the_cookie() {
    let srv = TestServer::spawn().await;
    let res = srv
        .send_json(reqwest::Method::POST, "/api/auth/logout", None, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = set_cookie(&res).unwrap();
    assert!(cookie.starts_with("ch_app_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn logging_out_twice_leaves_the_same_signed_out_state() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;

    let mut cleared = Vec::new();
    for _ in 0..2 {
        let res = srv
            .send_json(reqwest::Method::POST, "/api/auth/logout", Some(&root), json!({}))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = set_cookie(&res).unwrap();
        assert!(cookie.contains("Max-Age=0"));
        cleared.push(cookie);

        // The browser drops the cookie; nothing else identifies the caller.
        assert_eq!(srv.get("/api/auth/me", None).await.status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(cleared[0], cleared[1]);
}

#[tokio::test]
async fn malformed_bodies_get_structured_validation_errors() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;

    // Required fields missing.
    let res = srv
        .send_json(reqwest::Method::POST, "/api/admin/users", Some(&root), json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let res = srv
        .send_json(reqwest::Method::POST, "/api/superadmin/tenants", Some(&root), json!({ "name": "No Slug" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Not JSON at all, and no content type.
    let res = srv
        .client
        .post(srv.url("/api/auth/login"))
        .body("email=root@example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn edge_gate_redirects_anonymous_navigation() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/admin", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/login");

    let res = srv.get("/superadmin", None).await;
    assert_eq!(location(&res), "/superadmin/login");

    let res = srv.get("/dashboard", None).await;
    assert_eq!(location(&res), "/login");

    assert_eq!(srv.get("/", None).await.status(), StatusCode::OK);
    assert_eq!(srv.get("/login", None).await.status(), StatusCode::OK);
    assert_eq!(srv.get("/superadmin/login", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn signed_in_users_are_sent_to_their_home() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;

    for path in ["/", "/login", "/register", "/superadmin/login"] {
        let res = srv.get(path, Some(&root)).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&res), "/superadmin", "{path}");
    }

    let res = srv.get("/superadmin", Some(&root)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["page"], "superadmin");
}

#[tokio::test]
async fn forged_and_expired_tokens_are_treated_as_anonymous() {
    let srv = TestServer::spawn().await;
    let now = Utc::now().timestamp();
    let claims = SessionClaims { sub: UserId::new(), role: Role::SuperAdmin, tenant_id: None, iat: now, exp: now + 600 };

    let forged = mint("some-other-secret-0123456789abcdef", &claims);
    let res = srv.get("/superadmin", Some(&forged)).await;
    assert_eq!(location(&res), "/superadmin/login");

    let expired = mint(SECRET, &SessionClaims { iat: now - 600, exp: now - 1, ..claims.clone() });
    let res = srv.get("/dashboard", Some(&expired)).await;
    assert_eq!(location(&res), "/login");

    let res = srv.get("/api/auth/me", Some(&forged)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_for_unknown_identity_is_cleared_by_the_page_guard() {
    let srv = TestServer::spawn().await;
    let now = Utc::now().timestamp();
    let ghost = mint(
        SECRET,
        &SessionClaims { sub: UserId::new(), role: Role::User, tenant_id: None, iat: now, exp: now + 600 },
    );

    // The gate trusts the signature; the page re-reads storage and finds nobody.
    let res = srv.get("/dashboard", Some(&ghost)).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/login");
    assert!(set_cookie(&res).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn church_content_stays_inside_its_tenant() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    let (tenant_id, admin_email) = srv.create_church(&root, "st-marys").await;
    let admin = srv.login(&admin_email, "adminpassword").await;

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/notifications",
            Some(&admin),
            json!({ "title": "Choir practice", "body": "Thursday at 7" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["item"]["tenantId"], tenant_id.as_str());
    let item_id = created["item"]["id"].as_str().unwrap().to_string();

    let public: Value = srv.get("/notifications", None).await.json().await.unwrap();
    assert!(public["items"].as_array().unwrap().is_empty());

    let res = srv.get(&format!("/api/notifications/{item_id}"), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let own: Value = srv.get("/api/notifications", Some(&admin)).await.json().await.unwrap();
    assert_eq!(own["items"].as_array().unwrap().len(), 1);

    // A second church's admin cannot see it either.
    let (_, other_email) = srv.create_church(&root, "grace-chapel").await;
    let other = srv.login(&other_email, "adminpassword").await;
    let res = srv.get(&format!("/api/notifications/{item_id}"), Some(&other)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn church_admin_is_kept_out_of_superadmin_surfaces() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    let (_, admin_email) = srv.create_church(&root, "st-marys").await;
    let admin = srv.login(&admin_email, "adminpassword").await;

    let res = srv.get("/superadmin", Some(&admin)).await;
    assert_eq!(location(&res), "/admin");

    let res = srv.get("/api/superadmin/tenants", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/admin/users",
            Some(&admin),
            json!({ "email": "elevated@st-marys.org", "password": "memberpassword", "role": "SUPERADMIN" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn demotion_takes_effect_before_the_token_expires() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    let (tenant_id, _) = srv.create_church(&root, "st-marys").await;

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/admin/users",
            Some(&root),
            json!({
                "email": "deacon@st-marys.org",
                "password": "deaconpassword",
                "role": "CHURCH_ADMIN",
                "tenantId": tenant_id,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let user_id = res.json::<Value>().await.unwrap()["user"]["id"].as_str().unwrap().to_string();

    let deacon = srv.login("deacon@st-marys.org", "deaconpassword").await;
    assert_eq!(srv.get("/admin", Some(&deacon)).await.status(), StatusCode::OK);

    let res = srv
        .send_json(
            reqwest::Method::PATCH,
            &format!("/api/admin/users/{user_id}"),
            Some(&root),
            json!({ "role": "USER" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Token still says CHURCH_ADMIN, so the gate lets it through; storage says USER.
    let res = srv.get("/admin", Some(&deacon)).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/dashboard");

    let res = srv.get("/api/admin/users", Some(&deacon)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Deleting the identity ends the session outright.
    let res = srv
        .client
        .delete(srv.url(&format!("/api/admin/users/{user_id}")))
        .header(header::COOKIE, &root)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(srv.get("/api/auth/me", Some(&deacon)).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_requires_a_known_church_and_a_valid_token() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    let (tenant_id, _) = srv.create_church(&root, "st-marys").await;

    let page: Value = srv.get("/register", None).await.json().await.unwrap();
    assert_eq!(page["churches"][0]["id"], tenant_id.as_str());

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/auth/register",
            None,
            json!({
                "name": "New Member",
                "email": "new@st-marys.org",
                "password": "memberpassword",
                "tenantId": UserId::new().to_string(),
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/auth/register",
            None,
            json!({
                "name": "New Member",
                "email": "new@st-marys.org",
                "password": "memberpassword",
                "tenantId": tenant_id,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv
        .send_json(
            reqwest::Method::POST,
            "/api/auth/register",
            None,
            json!({
                "name": "Again",
                "email": "new@st-marys.org",
                "password": "memberpassword",
                "tenantId": tenant_id,
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv.get("/api/auth/verify?token=not-a-real-token", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unverified members may still sign in.
    let member = srv.login("new@st-marys.org", "memberpassword").await;
    let page: Value = srv.get("/dashboard", Some(&member)).await.json().await.unwrap();
    assert_eq!(page["page"], "dashboard");
    assert_eq!(page["noTenant"], false);
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;

    let res = srv
        .send_json(reqwest::Method::PATCH, "/api/admin/users/not-a-uuid", Some(&root), json!({ "name": "x" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.get("/api/sections/not-a-uuid", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn live_stream_is_publicly_readable_per_church() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    let (tenant_id, admin_email) = srv.create_church(&root, "st-marys").await;
    let admin = srv.login(&admin_email, "adminpassword").await;

    let res = srv
        .send_json(
            reqwest::Method::PUT,
            "/api/live-stream",
            Some(&admin),
            json!({ "streamUrl": "https://video.example.com/st-marys", "isLive": true, "title": "Sunday" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = srv
        .get(&format!("/api/live-stream?tenantId={tenant_id}"), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["liveStream"]["isLive"], true);

    let res = srv.get("/api/live-stream", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
