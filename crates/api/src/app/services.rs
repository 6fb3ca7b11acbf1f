//! Storage selection and service wiring.

use std::sync::Arc;

use anyhow::Context;

use chapel_auth::{AuthConfig, AuthService, EdgeGate, SessionManager, TokenCodec};
use chapel_content::ContentService;
use chapel_infra::{PostgresStore, Repositories};

use crate::config::Config;

/// Everything a handler needs, shared behind one `Arc`.
pub struct AppServices {
    pub auth: AuthService,
    pub content: ContentService,
    pub gate: EdgeGate,
    pub base_url: String,
}

impl AppServices {
    pub fn new(repos: Repositories, auth_config: AuthConfig, base_url: impl Into<String>) -> anyhow::Result<Self> {
        let codec = Arc::new(TokenCodec::from_config(&auth_config).context("invalid session secret")?);
        let sessions = SessionManager::new(codec.clone(), repos.identities.clone(), repos.tenants.clone());

        Ok(Self {
            auth: AuthService::new(repos.identities.clone(), repos.tenants.clone(), sessions, auth_config),
            content: ContentService::new(repos.content, repos.prayers, repos.live_streams, repos.tenants),
            gate: EdgeGate::new(codec),
            base_url: base_url.into(),
        })
    }

    pub fn auth_config(&self) -> &AuthConfig {
        self.auth.config()
    }
}

/// Open the configured store and seed the first SUPERADMIN when asked to.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let repos = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url).await.context("failed to connect to postgres")?;
            store.ensure_schema().await.context("failed to apply schema")?;
            tracing::info!("using postgres store");
            Repositories::from_store(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Repositories::in_memory()
        }
    };

    let services = AppServices::new(repos, config.auth.clone(), config.base_url.clone())?;

    if let Some(bootstrap) = &config.bootstrap {
        services
            .auth
            .bootstrap_superadmin(&bootstrap.email, &bootstrap.password)
            .await
            .context("failed to seed superadmin")?;
    }

    Ok(services)
}
