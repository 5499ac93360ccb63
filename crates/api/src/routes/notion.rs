//! Route definitions for the `/integrations/notion` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::notion;
use crate::state::AppState;

/// Routes mounted at `/integrations/notion`.
///
/// ```text
/// GET    /connect   -> connect (requires auth)
/// GET    /callback  -> callback (called by Notion, no auth)
/// GET    /status    -> status (requires auth)
/// DELETE /          -> disconnect (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect", get(notion::connect))
        .route("/callback", get(notion::callback))
        .route("/status", get(notion::status))
        .route("/", delete(notion::disconnect))
}
