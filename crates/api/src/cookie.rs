//! Session cookie formatting and extraction.

use axum::http::{header, HeaderMap};

use chapel_auth::{AuthConfig, IssuedToken};

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie(config: &AuthConfig, issued: &IssuedToken) -> String {
    build(config, &issued.token, issued.max_age_secs)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &AuthConfig) -> String {
    build(config, "", 0)
}

fn build(config: &AuthConfig, value: &str, max_age: i64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        config.cookie_name, value, max_age
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Read the session token from every `Cookie` header on the request.
///
/// Empty values are treated as absent.
pub fn read_session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
