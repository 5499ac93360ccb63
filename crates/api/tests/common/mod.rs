//! Shared harness for API integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production) over a test database pool, with a recording fake standing
//! in for the Notion document API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use url::Url;

use promptdock_api::auth::jwt::{generate_access_token, JwtConfig};
use promptdock_api::config::{NotionSettings, ServerConfig};
use promptdock_api::router::build_app_router;
use promptdock_api::state::AppState;
use promptdock_core::crypto::TokenCipher;
use promptdock_core::types::DbId;
use promptdock_db::models::connection::UpsertNotionConnection;
use promptdock_db::repositories::NotionConnectionRepo;
use promptdock_notion::api::{DatabaseEntry, NotionApi, NotionApiError};
use promptdock_notion::oauth::OAuthClient;

/// Fixed 32-byte key (hex) used by all tests.
pub const TEST_ENCRYPTION_KEY: &str =
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        notion: NotionSettings {
            client_id: "client-123".to_string(),
            client_secret: "secret-456".to_string(),
            redirect_uri: "http://localhost:3000/api/v1/integrations/notion/callback"
                .to_string(),
            frontend_url: Url::parse("http://localhost:5173/settings/integrations").unwrap(),
            token_encryption_key: TEST_ENCRYPTION_KEY.to_string(),
        },
    }
}

/// One recorded call against the fake Notion API.
#[derive(Debug, Clone)]
pub enum FakeCall {
    Page {
        access_token: String,
        parent_page_id: String,
        title: String,
        body: String,
    },
    DatabaseEntry {
        access_token: String,
        database_id: String,
        title: String,
        body: String,
        category: Option<String>,
        tags: Vec<String>,
    },
}

/// Recording fake for the Notion document API.
pub struct FakeNotion {
    calls: Mutex<Vec<FakeCall>>,
    fail_with_status: Option<u16>,
}

impl FakeNotion {
    /// A fake whose calls all succeed with fixed ids.
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with_status: None,
        })
    }

    /// A fake whose calls all fail with the given upstream status.
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with_status: Some(status),
        })
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn outcome(&self, id: &str) -> Result<String, NotionApiError> {
        match self.fail_with_status {
            Some(status) => Err(NotionApiError::Api {
                status,
                body: "fake upstream failure".to_string(),
            }),
            None => Ok(id.to_string()),
        }
    }
}

#[async_trait]
impl NotionApi for FakeNotion {
    async fn create_page(
        &self,
        access_token: &str,
        parent_page_id: &str,
        title: &str,
        body: &str,
    ) -> Result<String, NotionApiError> {
        self.calls.lock().unwrap().push(FakeCall::Page {
            access_token: access_token.to_string(),
            parent_page_id: parent_page_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        self.outcome("page-123")
    }

    async fn create_database_entry(
        &self,
        access_token: &str,
        database_id: &str,
        entry: &DatabaseEntry,
    ) -> Result<String, NotionApiError> {
        self.calls.lock().unwrap().push(FakeCall::DatabaseEntry {
            access_token: access_token.to_string(),
            database_id: database_id.to_string(),
            title: entry.title.clone(),
            body: entry.body.clone(),
            category: entry.category.clone(),
            tags: entry.tags.clone(),
        });
        self.outcome("entry-456")
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool and fake Notion API.
pub fn build_test_app(pool: PgPool, notion: Arc<dyn NotionApi>) -> Router {
    let config = test_config();
    let cipher = TokenCipher::from_hex_key(&config.notion.token_encryption_key)
        .expect("test encryption key should be valid");
    let oauth = OAuthClient::new(
        config.notion.client_id.clone(),
        config.notion.client_secret.clone(),
        config.notion.redirect_uri.clone(),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cipher: Arc::new(cipher),
        oauth: Arc::new(oauth),
        notion,
    };

    build_app_router(state, &config)
}

/// `Authorization` header value for the given user.
pub fn auth_header(user_id: DbId) -> String {
    let token = generate_access_token(user_id, &test_config().jwt)
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

/// Store an encrypted connection row for a user, as the OAuth callback
/// would after a successful exchange.
pub async fn link_workspace(pool: &PgPool, user_id: DbId, plaintext_token: &str) {
    let cipher = TokenCipher::from_hex_key(TEST_ENCRYPTION_KEY).unwrap();
    let input = UpsertNotionConnection {
        encrypted_access_token: cipher.encrypt(plaintext_token).unwrap(),
        encrypted_refresh_token: None,
        workspace_name: Some("Test Workspace".to_string()),
        workspace_id: Some("ws-test".to_string()),
        expires_at: None,
    };
    NotionConnectionRepo::upsert(pool, user_id, promptdock_notion::PROVIDER, &input)
        .await
        .expect("linking the test workspace should succeed");
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
