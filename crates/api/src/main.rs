use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptdock_api::config::ServerConfig;
use promptdock_api::router::build_app_router;
use promptdock_api::state::AppState;
use promptdock_core::crypto::TokenCipher;
use promptdock_notion::api::NotionClient;
use promptdock_notion::oauth::OAuthClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptdock_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Token cipher (key validated here, before any traffic) ---
    let cipher = TokenCipher::from_hex_key(&config.notion.token_encryption_key)
        .expect("TOKEN_ENCRYPTION_KEY must be 64 hex characters (32 bytes)");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = promptdock_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    promptdock_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    promptdock_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notion clients ---
    let oauth = OAuthClient::new(
        config.notion.client_id.clone(),
        config.notion.client_secret.clone(),
        config.notion.redirect_uri.clone(),
    );

    // --- Application state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cipher: Arc::new(cipher),
        oauth: Arc::new(oauth),
        notion: Arc::new(NotionClient::new()),
    };

    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT must form a valid socket address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "promptdock API listening");

    axum::serve(listener, app)
        .await
        .expect("Server exited with an error");
}
