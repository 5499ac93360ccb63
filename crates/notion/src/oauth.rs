//! OAuth authorization-code flow against Notion.
//!
//! [`OAuthClient`] builds the authorize URL handed to the frontend and
//! performs the single code-for-token exchange at callback time. There is
//! no refresh flow: Notion integration tokens do not expire.

use serde::Deserialize;
use url::Url;

use crate::NOTION_VERSION;

/// Notion's OAuth authorize endpoint.
const AUTHORIZE_URL: &str = "https://api.notion.com/v1/oauth/authorize";

/// Notion's OAuth token endpoint.
const TOKEN_URL: &str = "https://api.notion.com/v1/oauth/token";

/// Scopes requested during authorization, space-joined into the URL.
const SCOPES: &[&str] = &["read", "write"];

/// Errors from the OAuth exchange.
#[derive(Debug, thiserror::Error)]
pub enum NotionOAuthError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Notion returned a non-2xx status code.
    #[error("Notion token exchange failed ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Token payload returned by a successful exchange.
#[derive(Debug, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub workspace_name: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

/// OAuth client for one registered Notion integration.
pub struct OAuthClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    /// Create a client from the integration's registered credentials.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Build the authorize URL the user's browser is sent to.
    ///
    /// `state` is the opaque token that binds the eventual callback to the
    /// initiating user; Notion returns it unchanged.
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = Url::parse(AUTHORIZE_URL).expect("authorize endpoint is a valid URL");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("owner", "user")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state);
        url.into()
    }

    /// Exchange an authorization code for an access token.
    ///
    /// One `POST` with HTTP Basic auth from the client id/secret pair. A
    /// failed exchange is terminal for the callback; the user restarts the
    /// flow rather than the service retrying.
    pub async fn exchange(&self, code: &str) -> Result<OAuthTokenResponse, NotionOAuthError> {
        let body = serde_json::json!({
            "grant_type": "authorization_code",
            "code": code,
            "redirect_uri": self.redirect_uri,
        });

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotionOAuthError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<OAuthTokenResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(
            "client-123".to_string(),
            "secret-456".to_string(),
            "https://app.example.com/api/v1/integrations/notion/callback".to_string(),
        )
    }

    #[test]
    fn authorize_url_carries_all_parameters() {
        let url = Url::parse(&client().authorize_url("nonce:user")).unwrap();
        assert_eq!(url.host_str(), Some("api.notion.com"));
        assert_eq!(url.path(), "/v1/oauth/authorize");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("owner"), Some("user"));
        assert_eq!(get("scope"), Some("read write"));
        assert_eq!(get("state"), Some("nonce:user"));
        assert_eq!(
            get("redirect_uri"),
            Some("https://app.example.com/api/v1/integrations/notion/callback")
        );
    }

    #[test]
    fn redirect_uri_is_percent_encoded() {
        let url = client().authorize_url("s");
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com"));
    }

    #[test]
    fn token_response_tolerates_missing_optional_fields() {
        let parsed: OAuthTokenResponse =
            serde_json::from_str(r#"{"access_token": "secret_tok"}"#).unwrap();
        assert_eq!(parsed.access_token, "secret_tok");
        assert!(parsed.refresh_token.is_none());
        assert!(parsed.workspace_name.is_none());
    }
}
