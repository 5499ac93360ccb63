//! Integration tests for the Notion workspace-linking endpoints.
//!
//! Covers the connect URL, status before/after linking, idempotent
//! disconnect, auth enforcement, and every callback failure path that is
//! decidable without talking to Notion. Failures must land as frontend
//! redirects with a machine-readable reason, never as bare errors.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use tower::ServiceExt;
use url::Url;

use common::{auth_header, body_json, build_test_app, link_workspace, FakeNotion};
use promptdock_core::oauth_state;
use promptdock_db::models::user::CreateUser;
use promptdock_db::repositories::UserRepo;

async fn seed_user(pool: &PgPool) -> promptdock_db::models::user::User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "ada@example.com".to_string(),
            display_name: Some("Ada".to_string()),
        },
    )
    .await
    .unwrap()
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Location header of a redirect response, parsed as a URL.
fn redirect_location(response: &axum::response::Response) -> Url {
    let location = response
        .headers()
        .get("location")
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap();
    Url::parse(location).unwrap()
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

// ---------------------------------------------------------------------------
// Connect
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn connect_returns_authorize_url_bound_to_caller(pool: PgPool) {
    let user = seed_user(&pool).await;
    let app = build_test_app(pool, FakeNotion::succeeding());

    let response = app
        .oneshot(get(
            "/api/v1/integrations/notion/connect",
            Some(&auth_header(user.id)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let url = Url::parse(json["data"]["url"].as_str().unwrap()).unwrap();
    assert_eq!(url.host_str(), Some("api.notion.com"));
    assert_eq!(url.path(), "/v1/oauth/authorize");

    // The state in the URL matches the returned state and parses back to
    // the calling user.
    let state_in_url = query_param(&url, "state").unwrap();
    assert_eq!(json["data"]["state"].as_str().unwrap(), state_in_url);
    let parsed = oauth_state::parse(&state_in_url).unwrap();
    assert_eq!(parsed.user_id, user.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn connect_requires_auth(pool: PgPool) {
    let app = build_test_app(pool, FakeNotion::succeeding());

    let response = app
        .oneshot(get("/api/v1/integrations/notion/connect", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Status / disconnect
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_reports_not_connected(pool: PgPool) {
    let user = seed_user(&pool).await;
    let app = build_test_app(pool, FakeNotion::succeeding());

    let response = app
        .oneshot(get(
            "/api/v1/integrations/notion/status",
            Some(&auth_header(user.id)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["connected"], false);
    assert!(json["data"]["workspace"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_reports_linked_workspace(pool: PgPool) {
    let user = seed_user(&pool).await;
    link_workspace(&pool, user.id, "secret_token").await;
    let app = build_test_app(pool, FakeNotion::succeeding());

    let response = app
        .oneshot(get(
            "/api/v1/integrations/notion/status",
            Some(&auth_header(user.id)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["connected"], true);
    assert_eq!(json["data"]["workspace"]["name"], "Test Workspace");
    assert_eq!(json["data"]["workspace"]["id"], "ws-test");
    assert!(json["data"]["last_updated"].is_string());
    // Token ciphertext must never appear in responses.
    assert!(json["data"].get("encrypted_access_token").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disconnect_is_idempotent(pool: PgPool) {
    let user = seed_user(&pool).await;
    link_workspace(&pool, user.id, "secret_token").await;
    let app = build_test_app(pool, FakeNotion::succeeding());

    let delete = |auth: String| {
        Request::builder()
            .method("DELETE")
            .uri("/api/v1/integrations/notion")
            .header("authorization", auth)
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(delete(auth_header(user.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["disconnected"], true);

    // Second removal is not an error.
    let response = app.oneshot(delete(auth_header(user.id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["disconnected"], false);
}

// ---------------------------------------------------------------------------
// Callback failure paths (no external call involved)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_with_provider_error_redirects_oauth_failed(pool: PgPool) {
    let user = seed_user(&pool).await;
    let state = oauth_state::issue(user.id);
    let app = build_test_app(pool, FakeNotion::succeeding());

    let response = app
        .oneshot(get(
            &format!("/api/v1/integrations/notion/callback?error=access_denied&state={state}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = redirect_location(&response);
    assert_eq!(query_param(&location, "error").as_deref(), Some("oauth_failed"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_without_state_redirects_invalid_state(pool: PgPool) {
    let app = build_test_app(pool, FakeNotion::succeeding());

    let response = app
        .oneshot(get("/api/v1/integrations/notion/callback?code=abc", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = redirect_location(&response);
    assert_eq!(
        query_param(&location, "error").as_deref(),
        Some("invalid_state")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_with_unparseable_state_redirects_invalid_state(pool: PgPool) {
    let app = build_test_app(pool, FakeNotion::succeeding());

    for bad_state in ["onlynonce", ":", "nonce:not-a-uuid"] {
        let response = app
            .clone()
            .oneshot(get(
                &format!("/api/v1/integrations/notion/callback?code=abc&state={bad_state}"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = redirect_location(&response);
        assert_eq!(
            query_param(&location, "error").as_deref(),
            Some("invalid_state"),
            "state {bad_state:?} should be rejected",
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_without_code_redirects_missing_code(pool: PgPool) {
    let user = seed_user(&pool).await;
    let state = oauth_state::issue(user.id);
    let app = build_test_app(pool.clone(), FakeNotion::succeeding());

    let response = app
        .oneshot(get(
            &format!("/api/v1/integrations/notion/callback?state={state}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = redirect_location(&response);
    assert_eq!(
        query_param(&location, "error").as_deref(),
        Some("missing_code")
    );

    // Nothing was stored for the user.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notion_connections")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
