//! Repository for the `notion_connections` table.

use promptdock_core::types::DbId;
use sqlx::PgPool;

use crate::models::connection::{NotionConnection, UpsertNotionConnection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, provider, encrypted_access_token, \
    encrypted_refresh_token, workspace_name, workspace_id, expires_at, \
    created_at, updated_at";

/// Provides CRUD operations for provider connections.
pub struct NotionConnectionRepo;

impl NotionConnectionRepo {
    /// Upsert a connection: insert, or replace the token and workspace
    /// fields if one already exists for the (user, provider) pair.
    ///
    /// The unique constraint on (user_id, provider) makes concurrent
    /// first-time connects collapse into one row; `created_at` survives
    /// re-authorization while `updated_at` is refreshed.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        provider: &str,
        input: &UpsertNotionConnection,
    ) -> Result<NotionConnection, sqlx::Error> {
        let query = format!(
            "INSERT INTO notion_connections \
                (user_id, provider, encrypted_access_token, encrypted_refresh_token, \
                 workspace_name, workspace_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id, provider) DO UPDATE SET \
                encrypted_access_token = EXCLUDED.encrypted_access_token, \
                encrypted_refresh_token = EXCLUDED.encrypted_refresh_token, \
                workspace_name = EXCLUDED.workspace_name, \
                workspace_id = EXCLUDED.workspace_id, \
                expires_at = EXCLUDED.expires_at, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotionConnection>(&query)
            .bind(user_id)
            .bind(provider)
            .bind(&input.encrypted_access_token)
            .bind(&input.encrypted_refresh_token)
            .bind(&input.workspace_name)
            .bind(&input.workspace_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a connection by user and provider.
    pub async fn find_by_user_provider(
        pool: &PgPool,
        user_id: DbId,
        provider: &str,
    ) -> Result<Option<NotionConnection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notion_connections \
             WHERE user_id = $1 AND provider = $2"
        );
        sqlx::query_as::<_, NotionConnection>(&query)
            .bind(user_id)
            .bind(provider)
            .fetch_optional(pool)
            .await
    }

    /// Delete a connection for a (user, provider) pair. Returns `true` if
    /// a row was deleted; deleting an absent connection is not an error.
    pub async fn delete(
        pool: &PgPool,
        user_id: DbId,
        provider: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM notion_connections WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
