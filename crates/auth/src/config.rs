//! Auth configuration.

use std::time::Duration;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "ch_app_session";

/// Session token lifetime in days.
pub const SESSION_LIFETIME_DAYS: u64 = 7;

/// Minimum accepted plaintext password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing key for session tokens.
    pub session_secret: String,
    pub session_lifetime: Duration,
    pub cookie_name: String,
    /// Emit `Secure` on the session cookie (production).
    pub secure_cookies: bool,
    pub min_password_length: usize,
}

impl AuthConfig {
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
            session_lifetime: Duration::from_secs(SESSION_LIFETIME_DAYS * 24 * 60 * 60),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            secure_cookies: false,
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    pub fn with_min_password_length(mut self, len: usize) -> Self {
        self.min_password_length = len;
        self
    }

    pub fn session_lifetime_secs(&self) -> i64 {
        i64::try_from(self.session_lifetime.as_secs()).unwrap_or(i64::MAX)
    }
}
