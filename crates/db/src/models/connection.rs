//! Provider connection model and DTOs.
//!
//! One row per linked external workspace for a (user, provider) pair.
//! Token columns are ciphertext and skipped during serialization so they
//! can never leak through an API response.

use promptdock_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notion_connections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotionConnection {
    pub id: DbId,
    pub user_id: DbId,
    /// Provider key, e.g. `"notion"`. A string rather than an enum so new
    /// providers don't require a schema change.
    pub provider: String,
    /// Encrypted access token bytes. Skipped during serialization.
    #[serde(skip_serializing)]
    pub encrypted_access_token: Vec<u8>,
    /// Encrypted refresh token bytes, when the provider issued one.
    #[serde(skip_serializing)]
    pub encrypted_refresh_token: Option<Vec<u8>>,
    pub workspace_name: Option<String>,
    pub workspace_id: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields written on connect or re-authorization.
#[derive(Debug, Clone)]
pub struct UpsertNotionConnection {
    pub encrypted_access_token: Vec<u8>,
    pub encrypted_refresh_token: Option<Vec<u8>>,
    pub workspace_name: Option<String>,
    pub workspace_id: Option<String>,
    pub expires_at: Option<Timestamp>,
}
