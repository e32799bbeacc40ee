/// API routes and handlers
pub mod middleware;
pub mod oauth;
pub mod projects;
pub mod session;
pub mod users;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(session::routes())
        .merge(oauth::routes())
        .merge(users::routes())
        .merge(projects::routes())
}
