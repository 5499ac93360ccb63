use std::sync::Arc;

use promptdock_core::crypto::TokenCipher;
use promptdock_notion::api::NotionApi;
use promptdock_notion::oauth::OAuthClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`). Everything here is read-only after startup; request handlers
/// share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: promptdock_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Token-at-rest cipher, built once from the configured key.
    pub cipher: Arc<TokenCipher>,
    /// OAuth client for the registered Notion integration.
    pub oauth: Arc<OAuthClient>,
    /// Notion document-creation API (trait object so tests can substitute
    /// a fake).
    pub notion: Arc<dyn NotionApi>,
}
