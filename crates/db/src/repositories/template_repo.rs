//! Repository for the `templates` table.

use promptdock_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::{CreateTemplate, Template};

const COLUMNS: &str = "id, owner_id, title, description, prompt_body, category, \
    tags, variables, is_public, usage_count, created_at, updated_at";

/// Provides read and usage-accounting operations for templates.
///
/// Full template CRUD is served elsewhere; the export path only needs to
/// load a template and bump its usage counter.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateTemplate,
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates \
                (owner_id, title, description, prompt_body, category, tags, variables, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.prompt_body)
            .bind(&input.category)
            .bind(&input.tags)
            .bind(&input.variables)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Increment a template's usage count by one.
    ///
    /// A single storage-level increment, never read-modify-write, so
    /// concurrent exports of the same template cannot lose updates.
    /// Returns `true` if a row was touched.
    pub async fn increment_usage(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE templates SET usage_count = usage_count + 1 WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
