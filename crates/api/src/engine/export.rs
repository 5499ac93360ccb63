//! Template-to-Notion export engine.
//!
//! One export is a straight-line sequence: load the template, authorize
//! the caller, load and decrypt the stored credential, interpolate the
//! body, create the target document, record usage. Each step has its own
//! failure in [`ExportError`] so the handler can map them to distinct
//! response statuses. Usage accounting runs after the external write has
//! already succeeded, so its failure is logged and swallowed rather than
//! failing the export.

use std::collections::HashMap;
use std::sync::Arc;

use promptdock_core::crypto::TokenCipher;
use promptdock_core::interpolate::interpolate;
use promptdock_core::types::DbId;
use promptdock_db::repositories::{NotionConnectionRepo, TemplateRepo};
use promptdock_notion::api::{DatabaseEntry, NotionApi, NotionApiError};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Target document shape in the external workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// A new page nested under an existing page.
    Page,
    /// A new row in an existing database.
    Database,
}

/// Caller-supplied export parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub mode: ExportMode,
    /// Id of the parent page or target database in the external workspace.
    pub target_id: String,
    /// Placeholder name to substitution value. Placeholders without an
    /// entry stay literal in the exported body.
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// Result of a successful export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    /// Id of the created page or database entry.
    pub external_resource_id: String,
    pub mode: ExportMode,
}

/// Failure taxonomy for one export, mapped to distinct response statuses
/// by the error layer.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Template not found")]
    TemplateNotFound,

    #[error("You do not have access to this template")]
    AccessDenied,

    #[error("No Notion workspace is linked to this account")]
    CredentialMissing,

    #[error("Stored Notion credential could not be decrypted")]
    CredentialCorrupted,

    #[error(transparent)]
    ExternalApi(#[from] NotionApiError),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Runs one export end to end.
pub struct ExportEngine {
    pool: PgPool,
    cipher: Arc<TokenCipher>,
    notion: Arc<dyn NotionApi>,
}

impl ExportEngine {
    pub fn new(pool: PgPool, cipher: Arc<TokenCipher>, notion: Arc<dyn NotionApi>) -> Self {
        Self {
            pool,
            cipher,
            notion,
        }
    }

    /// Export `template_id` into the caller's linked Notion workspace.
    ///
    /// The template must be public or owned by `user_id`. No external
    /// call is made until the caller is authorized and a credential is on
    /// file.
    pub async fn export(
        &self,
        user_id: DbId,
        template_id: DbId,
        request: &ExportRequest,
    ) -> Result<ExportOutcome, ExportError> {
        let template = TemplateRepo::find_by_id(&self.pool, template_id)
            .await?
            .ok_or(ExportError::TemplateNotFound)?;

        if !template.is_public && template.owner_id != user_id {
            return Err(ExportError::AccessDenied);
        }

        let connection = NotionConnectionRepo::find_by_user_provider(
            &self.pool,
            user_id,
            promptdock_notion::PROVIDER,
        )
        .await?
        .ok_or(ExportError::CredentialMissing)?;

        let access_token = self
            .cipher
            .decrypt(&connection.encrypted_access_token)
            .map_err(|e| {
                // A decrypt failure can also mean the key changed underneath
                // stored rows, so the cryptographic cause goes to the logs.
                tracing::error!(
                    user_id = %user_id,
                    connection_id = %connection.id,
                    error = %e,
                    "Stored Notion token failed to decrypt",
                );
                ExportError::CredentialCorrupted
            })?;

        let rendered = interpolate(&template.prompt_body, &request.variables);

        let external_resource_id = match request.mode {
            ExportMode::Page => {
                self.notion
                    .create_page(&access_token, &request.target_id, &template.title, &rendered)
                    .await?
            }
            ExportMode::Database => {
                let entry = DatabaseEntry {
                    title: template.title.clone(),
                    body: rendered,
                    category: template.category.clone(),
                    tags: template.tags.clone(),
                };
                self.notion
                    .create_database_entry(&access_token, &request.target_id, &entry)
                    .await?
            }
        };

        // The external write already succeeded; a failed usage bump must
        // not turn the export into an error.
        if let Err(e) = TemplateRepo::increment_usage(&self.pool, template_id).await {
            tracing::warn!(
                template_id = %template_id,
                error = %e,
                "Failed to record template usage after export",
            );
        }

        tracing::info!(
            user_id = %user_id,
            template_id = %template_id,
            mode = ?request.mode,
            external_resource_id = %external_resource_id,
            "Template exported to Notion",
        );

        Ok(ExportOutcome {
            external_resource_id,
            mode: request.mode,
        })
    }
}
