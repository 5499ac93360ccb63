//! Route definitions, one module per resource.

pub mod health;
pub mod notion;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/integrations/notion", notion::router())
        .nest("/templates", templates::router())
}
