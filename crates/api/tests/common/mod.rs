//! Shared test harness: builds the full application router (identical
//! middleware stack to production) over a test database pool, plus small
//! request helpers for envelope-based assertions.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use procura_api::audit::AuditSink;
use procura_api::config::ServerConfig;
use procura_api::router::build_app_router;
use procura_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Mirrors `main.rs` exactly.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        audit: AuditSink::new(pool),
    };
    build_app_router(state, &config)
}

/// Issue a request against the router, returning status and parsed body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Seed a purchase order, returning its id.
pub async fn seed_order(pool: &PgPool, order_no: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO purchase_orders (order_no) VALUES ($1) RETURNING id")
        .bind(order_no)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Seed one purchase order line.
pub async fn seed_order_line(pool: &PgPool, order_id: i64, product_id: i64, quantity: i64) {
    sqlx::query(
        "INSERT INTO purchase_order_items (purchase_order_id, product_id, ordered_quantity) \
         VALUES ($1, $2, $3)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await
    .unwrap();
}
