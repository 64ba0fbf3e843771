use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use hub_db::DbHandle;
use hubkit::SessionConfig;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::PortfolioConfig;
use crate::domain::ports::{MediaStore, PasswordHasher};
use crate::domain::repo::{PortfolioRepository, UsersRepository};
use crate::domain::{AuthService, FeedService, PortfolioService, ProfileService};
use crate::infra::media::FsMediaStore;
use crate::infra::password::Argon2Hasher;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmPortfolioRepository, SeaOrmUsersRepository};

/// Domain services shared by all handlers.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub items: PortfolioService,
    pub feed: FeedService,
    pub profile: ProfileService,
}

impl Services {
    pub fn new(
        config: &PortfolioConfig,
        users: Arc<dyn UsersRepository>,
        items: Arc<dyn PortfolioRepository>,
        media: Arc<dyn MediaStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone(), hasher),
            items: PortfolioService::new(items.clone(), media.clone()),
            feed: FeedService::new(items.clone(), config.page_size),
            profile: ProfileService::new(users, items, media),
        }
    }
}

/// The PortfoHub application module.
pub struct PortfolioModule {
    config: PortfolioConfig,
    upload_dir: PathBuf,
    services: Arc<Services>,
}

impl PortfolioModule {
    /// Run the schema migrations.
    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running portfolio database migrations");
        Migrator::up(db.seaorm(), None)
            .await
            .context("portfolio migrations failed")?;
        info!("Portfolio database migrations completed successfully");
        Ok(())
    }

    /// Wire repositories, media store and password hasher. `upload_dir` must
    /// already be absolute; it is created if missing.
    pub async fn init(
        config: PortfolioConfig,
        db: DatabaseConnection,
        upload_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        info!("Initializing portfolio module");
        debug!(
            "Loaded portfolio config: page_size={}, max_upload_bytes={}, remember_days={}",
            config.page_size, config.max_upload_bytes, config.remember_days
        );

        let media = FsMediaStore::new(&upload_dir, &config.allowed_extensions);
        media.ensure_dir().await?;
        let hasher = Argon2Hasher::new(&config.password)?;

        let services = Services::new(
            &config,
            Arc::new(SeaOrmUsersRepository::new(db.clone())),
            Arc::new(SeaOrmPortfolioRepository::new(db)),
            Arc::new(media),
            Arc::new(hasher),
        );

        info!(upload_dir = %upload_dir.display(), "Portfolio module ready");
        Ok(Self {
            config,
            upload_dir,
            services: Arc::new(services),
        })
    }

    pub fn services(&self) -> Arc<Services> {
        self.services.clone()
    }

    /// Cookie session settings derived from the module config.
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let cfg = SessionConfig::new(&self.config.secret_key, self.config.remember_lifetime())
            .map_err(|e| anyhow::anyhow!("invalid session secret: {e}"))?;
        Ok(cfg.with_secure(self.config.secure_cookies))
    }

    pub fn router(&self, router: Router) -> Router {
        info!("Registering portfolio routes");
        routes::register_routes(router, self.services(), &self.upload_dir)
    }
}
