//! Shared test fixtures
//!
//! Each test gets its own SQLite database in a temp directory with the
//! embedded migrations applied, plus the managers wired the way
//! `AppContext::new` wires them.
#![allow(dead_code)]

use crewmatch::{
    account::{AccountManager, SignupRequest},
    config::{AuthConfig, LoggingConfig, ServerConfig, ServiceConfig, StorageConfig},
    db,
    db::models::{ProjectRole, Stage, User},
    projects::{
        CreateProjectRequest, CreateRoleRequest, ProjectManager, ProjectView, RequestManager,
        RoleManager,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestEnv {
    pub db: SqlitePool,
    pub config: Arc<ServerConfig>,
    pub accounts: AccountManager,
    pub projects: ProjectManager,
    pub roles: RoleManager,
    pub requests: RequestManager,
    // Keeps the database file alive for the test's duration
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.sqlite");

    let db = db::create_pool(&path, db::DatabaseOptions::default())
        .await
        .unwrap();
    db::run_migrations(&db).await.unwrap();

    let config = Arc::new(test_config(dir.path().to_path_buf()));

    TestEnv {
        accounts: AccountManager::new(db.clone(), Arc::clone(&config)),
        projects: ProjectManager::new(db.clone()),
        roles: RoleManager::new(db.clone()),
        requests: RequestManager::new(db.clone()),
        db,
        config,
        _dir: dir,
    }
}

fn test_config(data_directory: std::path::PathBuf) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 0,
            request_timeout_secs: 5,
        },
        storage: StorageConfig {
            database: data_directory.join("test.sqlite"),
            data_directory,
        },
        authentication: AuthConfig {
            access_token_secret: "test-access-secret-0123456789abcdef".to_string(),
            access_token_expiry_hours: 2,
            refresh_token_secret: "test-refresh-secret-0123456789abcdef".to_string(),
            refresh_token_expiry_hours: 168,
        },
        oauth: None,
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}

pub fn signup_request(name: &str, email: &str, username: &str) -> SignupRequest {
    SignupRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "correct horse battery staple".to_string(),
        username: username.to_string(),
    }
}

/// Register a password user and return the record
pub async fn create_user(env: &TestEnv, name: &str, email: &str, username: &str) -> User {
    let (user, _tokens) = env
        .accounts
        .signup(&signup_request(name, email, username))
        .await
        .unwrap();
    user
}

pub fn project_request(title: &str) -> CreateProjectRequest {
    CreateProjectRequest {
        title: title.to_string(),
        description: "A project for testing".to_string(),
        goals: None,
        category_id: 1,
        stage: Stage::Idea,
        project_types: vec![1],
        technologies: vec![1, 2],
        languages: vec![1],
    }
}

/// Create a project owned by `creator_id`
pub async fn create_project(env: &TestEnv, creator_id: i64, title: &str) -> ProjectView {
    env.projects
        .create(creator_id, &project_request(title))
        .await
        .unwrap()
}

/// Create a role on a project, acting as its owner
pub async fn create_role(env: &TestEnv, owner_id: i64, project_id: i64) -> ProjectRole {
    env.roles
        .create(
            owner_id,
            &CreateRoleRequest {
                project_id,
                title: "Backend developer".to_string(),
                description: "Owns the API".to_string(),
                required_experience_level: 2,
            },
        )
        .await
        .unwrap()
}
