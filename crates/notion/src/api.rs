//! REST client for the Notion document-creation endpoints.
//!
//! The [`NotionApi`] trait is the capability the export engine depends
//! on: create a page, or create a database entry. [`NotionClient`] is the
//! production implementation over [`reqwest`]; tests substitute a
//! recording fake.

use async_trait::async_trait;
use serde::Deserialize;

use crate::NOTION_VERSION;

/// Base URL for the Notion REST API.
const API_URL: &str = "https://api.notion.com/v1";

/// Select label used when a template has no category.
const DEFAULT_CATEGORY: &str = "General";

/// Errors from the Notion REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum NotionApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Notion returned a non-2xx status code.
    #[error("Notion API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Content written into a database row.
#[derive(Debug, Clone)]
pub struct DatabaseEntry {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Document-creation operations the export engine needs from Notion.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Create a page under `parent_page_id` with the given title and a
    /// single paragraph of body text. Returns the new page's id.
    async fn create_page(
        &self,
        access_token: &str,
        parent_page_id: &str,
        title: &str,
        body: &str,
    ) -> Result<String, NotionApiError>;

    /// Create a row in the database identified by `database_id`. Returns
    /// the new entry's id.
    async fn create_database_entry(
        &self,
        access_token: &str,
        database_id: &str,
        entry: &DatabaseEntry,
    ) -> Result<String, NotionApiError>;
}

/// Production [`NotionApi`] implementation.
pub struct NotionClient {
    client: reqwest::Client,
    api_url: String,
}

/// Response envelope for created objects; only the id is used.
#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

impl NotionClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: API_URL.to_string(),
        }
    }

    /// Create a client against a non-default base URL.
    pub fn with_api_url(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    async fn post_page(
        &self,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> Result<String, NotionApiError> {
        let response = self
            .client
            .post(format!("{}/pages", self.api_url))
            .bearer_auth(access_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotionApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created = response.json::<CreatedObject>().await?;
        Ok(created.id)
    }
}

impl Default for NotionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn create_page(
        &self,
        access_token: &str,
        parent_page_id: &str,
        title: &str,
        body: &str,
    ) -> Result<String, NotionApiError> {
        let payload = page_payload(parent_page_id, title, body);
        self.post_page(access_token, &payload).await
    }

    async fn create_database_entry(
        &self,
        access_token: &str,
        database_id: &str,
        entry: &DatabaseEntry,
    ) -> Result<String, NotionApiError> {
        let payload = database_entry_payload(database_id, entry);
        self.post_page(access_token, &payload).await
    }
}

/// Request body for a child page: template title as the page title, the
/// rendered body as one paragraph block.
fn page_payload(parent_page_id: &str, title: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "parent": { "page_id": parent_page_id },
        "properties": {
            "title": {
                "title": [{ "text": { "content": title } }]
            }
        },
        "children": [{
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{ "type": "text", "text": { "content": body } }]
            }
        }]
    })
}

/// Request body for a database row: title property, rich-text body,
/// single-select category (defaulted when absent), multi-select tags.
fn database_entry_payload(database_id: &str, entry: &DatabaseEntry) -> serde_json::Value {
    let category = entry.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
    let tags: Vec<serde_json::Value> = entry
        .tags
        .iter()
        .map(|tag| serde_json::json!({ "name": tag }))
        .collect();

    serde_json::json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Name": {
                "title": [{ "text": { "content": entry.title } }]
            },
            "Prompt": {
                "rich_text": [{ "text": { "content": entry.body } }]
            },
            "Category": {
                "select": { "name": category }
            },
            "Tags": {
                "multi_select": tags
            }
        }
    })
}
