/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    db,
    error::ApiResult,
    oauth::GoogleClient,
    projects::{ProjectManager, RequestManager, RoleManager},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub projects: Arc<ProjectManager>,
    pub roles: Arc<RoleManager>,
    pub requests: Arc<RequestManager>,
    /// Present only when federated login is configured
    pub google: Option<Arc<GoogleClient>>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;

        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let config = Arc::new(config);

        let accounts = Arc::new(AccountManager::new(db.clone(), Arc::clone(&config)));
        let projects = Arc::new(ProjectManager::new(db.clone()));
        let roles = Arc::new(RoleManager::new(db.clone()));
        let requests = Arc::new(RequestManager::new(db.clone()));

        let google = match &config.oauth {
            Some(oauth) => Some(Arc::new(GoogleClient::new(oauth.clone()))),
            None => {
                tracing::info!("Google OAuth not configured; federated login disabled");
                None
            }
        };

        Ok(Self {
            config,
            db,
            accounts,
            projects,
            roles,
            requests,
            google,
        })
    }

    /// Get the service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
