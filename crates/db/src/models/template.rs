//! Template model and DTOs.

use promptdock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `templates` table.
///
/// `prompt_body` carries `{{placeholder}}` tokens; `variables` is the
/// structured declaration of the placeholder names and their primitive
/// kinds, stored as JSON.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub prompt_body: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub variables: Option<serde_json::Value>,
    pub is_public: bool,
    pub usage_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub title: String,
    pub description: Option<String>,
    pub prompt_body: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub variables: Option<serde_json::Value>,
    pub is_public: bool,
}
