//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::domain::User;
use yatube_core::pagination::Paginator;
use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, RateLimiter, TokenService, UserRepository,
};
use yatube_infra::{
    Argon2PasswordService, InMemoryRateLimiter, InMemoryStore, JwtTokenService,
};

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::{AdminBootstrap, AppConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub login_limiter: Arc<dyn RateLimiter>,
    pub paginator: Paginator,
    pub secure_cookies: bool,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        config.session.warn_if_default_secret(config.production);

        #[cfg(feature = "postgres")]
        let state = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => Self::postgres(config, connections),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(config)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(config)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory(config)
        };

        tracing::info!("Application state initialized");
        state
    }

    /// State backed by the in-memory store.
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = InMemoryStore::new();
        Self::assemble(
            config,
            Arc::new(store.users()),
            Arc::new(store.groups()),
            Arc::new(store.posts()),
        )
    }

    #[cfg(feature = "postgres")]
    fn postgres(config: &AppConfig, connections: DatabaseConnections) -> Self {
        let pool = &connections.main;
        let mut state = Self::assemble(
            config,
            Arc::new(PostgresUserRepository::new(Arc::clone(pool))),
            Arc::new(PostgresGroupRepository::new(Arc::clone(pool))),
            Arc::new(PostgresPostRepository::new(Arc::clone(pool))),
        );
        state.db = Some(Arc::new(connections));
        state
    }

    fn assemble(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            tokens: Arc::new(JwtTokenService::new(config.session.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            login_limiter: Arc::new(InMemoryRateLimiter::new(config.login_rate_limit.clone())),
            paginator: Paginator::default(),
            secure_cookies: config.production,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Make sure the configured staff account exists.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> anyhow::Result<()> {
        if self.users.find_by_username(&admin.username).await?.is_some() {
            tracing::debug!(username = %admin.username, "Staff account already present");
            return Ok(());
        }

        let hash = self.passwords.hash(&admin.password)?;
        let user = User::new(admin.username.clone(), hash).staff();
        self.users.create(user).await?;
        tracing::info!(username = %admin.username, "Staff account created");

        Ok(())
    }
}
