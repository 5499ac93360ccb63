use url::Url;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Host/port/CORS have sensible local-development defaults; everything
/// security-sensitive (JWT secret, Notion credentials, the token
/// encryption key) is required and aborts startup with an explicit
/// message when missing or malformed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Notion integration settings.
    pub notion: NotionSettings,
}

/// Settings for the registered Notion integration.
#[derive(Debug, Clone)]
pub struct NotionSettings {
    /// OAuth client id of the integration.
    pub client_id: String,
    /// OAuth client secret of the integration.
    pub client_secret: String,
    /// Redirect URI registered with Notion (this service's callback).
    pub redirect_uri: String,
    /// Frontend page the OAuth callback redirects back to.
    pub frontend_url: Url,
    /// 64-hex-character key (32 bytes) for token-at-rest encryption.
    /// Validated when the cipher is constructed at startup.
    pub token_encryption_key: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();
        let notion = NotionSettings::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            notion,
        }
    }
}

impl NotionSettings {
    /// Load Notion settings from environment variables.
    ///
    /// | Env Var                | Required |
    /// |------------------------|----------|
    /// | `NOTION_CLIENT_ID`     | **yes**  |
    /// | `NOTION_CLIENT_SECRET` | **yes**  |
    /// | `NOTION_REDIRECT_URI`  | **yes**  |
    /// | `FRONTEND_URL`         | **yes**  |
    /// | `TOKEN_ENCRYPTION_KEY` | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if any variable is missing, or if `FRONTEND_URL` is not a
    /// valid absolute URL. The encryption key's format is validated when
    /// the cipher is built from it at startup.
    pub fn from_env() -> Self {
        let client_id = std::env::var("NOTION_CLIENT_ID")
            .expect("NOTION_CLIENT_ID must be set in the environment");
        let client_secret = std::env::var("NOTION_CLIENT_SECRET")
            .expect("NOTION_CLIENT_SECRET must be set in the environment");
        let redirect_uri = std::env::var("NOTION_REDIRECT_URI")
            .expect("NOTION_REDIRECT_URI must be set in the environment");

        let frontend_url = std::env::var("FRONTEND_URL")
            .expect("FRONTEND_URL must be set in the environment");
        let frontend_url =
            Url::parse(&frontend_url).expect("FRONTEND_URL must be a valid absolute URL");

        let token_encryption_key = std::env::var("TOKEN_ENCRYPTION_KEY")
            .expect("TOKEN_ENCRYPTION_KEY must be set in the environment");

        Self {
            client_id,
            client_secret,
            redirect_uri,
            frontend_url,
            token_encryption_key,
        }
    }
}
