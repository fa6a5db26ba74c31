#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use correx_api::config::ServerConfig;
use correx_api::router::build_app_router;
use correx_api::state::AppState;
use correx_core::content_types::ContentTypeRegistry;
use correx_db::repositories::ContentTypeRepo;

/// Extra applications registered on top of the built-ins for HTTP tests.
const TEST_REGISTRY_JSON: &str = r#"[
    {
        "label": "tests",
        "models": [
            {"model": "Article", "table": "test_articles", "label_column": "headline"},
            {"model": "Author", "table": "test_authors", "label_column": "first_name"}
        ]
    }
]"#;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        content_registry_path: None,
    }
}

/// The built-in registry plus the `tests` application.
pub fn test_registry() -> Arc<ContentTypeRegistry> {
    Arc::new(ContentTypeRegistry::from_json(TEST_REGISTRY_JSON).unwrap())
}

/// Build the full application router over `pool`, with the test tables
/// created and every registered kind synced into `content_types`.
///
/// Uses [`build_app_router`] so tests exercise the production middleware
/// stack.
pub async fn build_test_app(pool: PgPool) -> Router {
    sqlx::query("CREATE TABLE test_authors (id BIGSERIAL PRIMARY KEY, first_name TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE test_articles (id BIGSERIAL PRIMARY KEY, headline TEXT NOT NULL, \
         author_id BIGINT REFERENCES test_authors (id))",
    )
    .execute(&pool)
    .await
    .unwrap();

    let registry = test_registry();
    ContentTypeRepo::sync(&pool, &registry).await.unwrap();

    let config = test_config();
    let state = AppState::new(pool, config.clone(), registry);
    build_app_router(state, &config)
}

/// Look up the id of a synced content type.
pub async fn content_type_id(pool: &PgPool, app_label: &str, model: &str) -> i64 {
    ContentTypeRepo::find_by_natural_key(pool, app_label, model)
        .await
        .unwrap()
        .unwrap()
        .id
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Send a bodiless request with the given method.
pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a request with a JSON body.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}
