pub mod health;
pub mod portal;
pub mod share_link;
pub mod supply_record;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/purchase-orders/{id}/share-link           create, configure, get
/// /admin/purchase-orders/{id}/share-link/disable   disable (POST)
/// /admin/purchase-orders/{id}/supply-records       list all suppliers (GET)
/// /admin/supply-records/{id}/disable               administrative disable (POST)
///
/// /portal/{share_code}/verify                      consuming verification (POST)
/// /portal/{share_code}/order-items                 order lines (GET)
/// /portal/{share_code}/supply-records              list, create
/// /portal/{share_code}/supply-records/{id}         get, full-replacement update
/// ```
///
/// Admin routes are staff-facing; staff authentication is terminated
/// upstream. Portal routes are public and keyed by share code.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest(
            "/admin",
            share_link::admin_router().merge(supply_record::admin_router()),
        )
        .nest("/portal", portal::router())
}
