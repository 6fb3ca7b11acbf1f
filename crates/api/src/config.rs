//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use chapel_auth::AuthConfig;

const DEV_SESSION_SECRET: &str = "chapel-development-session-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),

    #[error("SESSION_SECRET must be at least {min} bytes")]
    SecretTooShort { min: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_production(self) -> bool {
        matches!(self, AppEnv::Production)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub env: AppEnv,
    pub auth: AuthConfig,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Prefix for links written to the log (email verification).
    pub base_url: String,
    pub bootstrap: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let env = match get("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") | Some("test") => AppEnv::Development,
            Some("production") | Some("prod") => AppEnv::Production,
            Some(_) => return Err(ConfigError::Invalid("APP_ENV")),
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("BIND_ADDR"))?;

        let session_secret = match get("SESSION_SECRET") {
            Some(secret) => secret,
            None if env.is_production() => return Err(ConfigError::Missing("SESSION_SECRET")),
            None => {
                tracing::warn!("SESSION_SECRET not set; using insecure development default");
                DEV_SESSION_SECRET.to_string()
            }
        };
        if session_secret.len() < chapel_auth::token::MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort { min: chapel_auth::token::MIN_SECRET_LEN });
        }

        let bootstrap = match (get("BOOTSTRAP_SUPERADMIN_EMAIL"), get("BOOTSTRAP_SUPERADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_SUPERADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("BOOTSTRAP_SUPERADMIN_EMAIL")),
        };

        let base_url = get("APP_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bind_addr,
            env,
            auth: AuthConfig::new(session_secret).with_secure_cookies(env.is_production()),
            database_url: get("DATABASE_URL"),
            base_url,
            bootstrap,
        })
    }

    /// In-memory configuration for tests and local tooling.
    pub fn in_memory(session_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            env: AppEnv::Development,
            auth: AuthConfig::new(session_secret),
            database_url: None,
            base_url: "http://localhost".to_string(),
            bootstrap: None,
        }
    }

    pub fn with_bootstrap(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.bootstrap = Some(BootstrapAdmin { email: email.into(), password: password.into() });
        self
    }
}
