//! Client crate for the Notion integration.
//!
//! [`oauth`] covers the authorization-code flow (authorize URL building
//! and the code-for-token exchange); [`api`] covers document creation
//! behind the [`api::NotionApi`] capability trait so callers can be tested
//! against a fake.

pub mod api;
pub mod oauth;

/// Provider key under which connections are stored.
pub const PROVIDER: &str = "notion";

/// Protocol version sent with every Notion API request.
pub const NOTION_VERSION: &str = "2022-06-28";
