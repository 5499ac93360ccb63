//! Handlers for linking a Notion workspace to an account.
//!
//! The connect handler hands the frontend an authorize URL; the provider
//! then calls the callback with a code and the state token issued here.
//! Every callback failure becomes a redirect back to the frontend with a
//! machine-readable `error` reason -- the provider-facing endpoint never
//! surfaces a bare 500.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use promptdock_core::oauth_state;
use promptdock_core::types::Timestamp;
use promptdock_db::models::connection::UpsertNotionConnection;
use promptdock_db::repositories::NotionConnectionRepo;
use promptdock_notion::PROVIDER;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Response for `GET /integrations/notion/connect`.
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Provider authorize URL the frontend sends the browser to.
    pub url: String,
    /// The state token embedded in that URL.
    pub state: String,
}

/// Query parameters Notion sends to the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Workspace fields exposed by the status endpoint.
#[derive(Debug, Serialize)]
pub struct WorkspaceInfo {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// Response for `GET /integrations/notion/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub connected: bool,
    pub workspace: Option<WorkspaceInfo>,
    pub last_updated: Option<Timestamp>,
}

/// Response for `DELETE /integrations/notion`.
#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    /// Whether a connection existed and was removed. Removing an absent
    /// connection succeeds with `false`.
    pub disconnected: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /integrations/notion/connect
///
/// Issue a state token bound to the caller and return the authorize URL.
/// The frontend performs the actual navigation; nothing redirects
/// server-side here.
pub async fn connect(
    user: AuthUser,
    State(app): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let state_token = oauth_state::issue(user.user_id);
    let url = app.oauth.authorize_url(&state_token);

    tracing::info!(user_id = %user.user_id, "Issued Notion authorize URL");

    Ok(Json(DataResponse {
        data: ConnectResponse {
            url,
            state: state_token,
        },
    }))
}

/// GET /integrations/notion/callback
///
/// Invoked by Notion, not by our frontend, so there is no JWT here: the
/// state token is what ties the callback to a user. All outcomes redirect
/// to the configured frontend page.
pub async fn callback(
    State(app): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    if let Some(provider_error) = &query.error {
        tracing::warn!(error = %provider_error, "Notion authorization was denied");
        return failure_redirect(&app, "oauth_failed");
    }

    let Some(state_token) = query.state.as_deref() else {
        tracing::warn!("Notion callback arrived without a state token");
        return failure_redirect(&app, "invalid_state");
    };
    let parsed = match oauth_state::parse(state_token) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Notion callback state failed to parse");
            return failure_redirect(&app, "invalid_state");
        }
    };

    let Some(code) = query.code.as_deref() else {
        tracing::warn!(user_id = %parsed.user_id, "Notion callback arrived without a code");
        return failure_redirect(&app, "missing_code");
    };

    let token = match app.oauth.exchange(code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(user_id = %parsed.user_id, error = %e, "Notion token exchange failed");
            return failure_redirect(&app, "token_exchange_failed");
        }
    };

    let encrypted_access_token = match app.cipher.encrypt(&token.access_token) {
        Ok(ciphertext) => ciphertext,
        Err(e) => {
            tracing::error!(user_id = %parsed.user_id, error = %e, "Failed to encrypt access token");
            return failure_redirect(&app, "unexpected_error");
        }
    };
    let encrypted_refresh_token = match &token.refresh_token {
        Some(refresh) => match app.cipher.encrypt(refresh) {
            Ok(ciphertext) => Some(ciphertext),
            Err(e) => {
                tracing::error!(user_id = %parsed.user_id, error = %e, "Failed to encrypt refresh token");
                return failure_redirect(&app, "unexpected_error");
            }
        },
        None => None,
    };

    let input = UpsertNotionConnection {
        encrypted_access_token,
        encrypted_refresh_token,
        workspace_name: token.workspace_name.clone(),
        workspace_id: token.workspace_id.clone(),
        expires_at: None,
    };

    match NotionConnectionRepo::upsert(&app.pool, parsed.user_id, PROVIDER, &input).await {
        Ok(connection) => {
            tracing::info!(
                user_id = %parsed.user_id,
                connection_id = %connection.id,
                workspace = connection.workspace_name.as_deref().unwrap_or(""),
                "Notion workspace linked",
            );
            let workspace = connection.workspace_name.as_deref().unwrap_or_default();
            frontend_redirect(&app, &[("connected", PROVIDER), ("workspace", workspace)])
        }
        Err(e) => {
            tracing::error!(user_id = %parsed.user_id, error = %e, "Failed to store Notion connection");
            failure_redirect(&app, "storage_failed")
        }
    }
}

/// GET /integrations/notion/status
pub async fn status(
    user: AuthUser,
    State(app): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let connection =
        NotionConnectionRepo::find_by_user_provider(&app.pool, user.user_id, PROVIDER).await?;

    let data = match connection {
        Some(connection) => StatusResponse {
            connected: true,
            workspace: Some(WorkspaceInfo {
                name: connection.workspace_name,
                id: connection.workspace_id,
            }),
            last_updated: Some(connection.updated_at),
        },
        None => StatusResponse {
            connected: false,
            workspace: None,
            last_updated: None,
        },
    };

    Ok(Json(DataResponse { data }))
}

/// DELETE /integrations/notion
pub async fn disconnect(
    user: AuthUser,
    State(app): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let disconnected =
        NotionConnectionRepo::delete(&app.pool, user.user_id, PROVIDER).await?;

    if disconnected {
        tracing::info!(user_id = %user.user_id, "Notion workspace unlinked");
    }

    Ok(Json(DataResponse {
        data: DisconnectResponse { disconnected },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Redirect to the configured frontend page with the given query params
/// appended.
fn frontend_redirect(app: &AppState, params: &[(&str, &str)]) -> Redirect {
    let mut url = app.config.notion.frontend_url.clone();
    url.query_pairs_mut().extend_pairs(params);
    Redirect::to(url.as_str())
}

/// Redirect to the frontend with a machine-readable failure reason.
fn failure_redirect(app: &AppState, reason: &str) -> Redirect {
    frontend_redirect(app, &[("error", reason)])
}
