//! Route definitions for the `/templates` resource.
//!
//! Template CRUD is served by the catalogue service; only the export
//! operation lives here.

use axum::routing::post;
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// POST /{id}/export/notion -> export_to_notion (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/export/notion", post(export::export_to_notion))
}
