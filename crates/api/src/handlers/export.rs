//! Handler for exporting a template into a linked Notion workspace.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use promptdock_core::types::DbId;

use crate::engine::export::{ExportEngine, ExportRequest};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /templates/{id}/export/notion
///
/// Push the template into the caller's linked workspace as a page or a
/// database entry. Fails with a typed error (mapped in `error.rs`) when
/// the template is missing, access is denied, or no workspace is linked.
pub async fn export_to_notion(
    user: AuthUser,
    State(app): State<AppState>,
    Path(template_id): Path<DbId>,
    Json(request): Json<ExportRequest>,
) -> AppResult<impl IntoResponse> {
    if request.target_id.trim().is_empty() {
        return Err(AppError::BadRequest("target_id must not be empty".into()));
    }

    let engine = ExportEngine::new(
        app.pool.clone(),
        Arc::clone(&app.cipher),
        Arc::clone(&app.notion),
    );
    let outcome = engine.export(user.user_id, template_id, &request).await?;

    Ok(Json(DataResponse { data: outcome }))
}
