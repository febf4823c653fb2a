//! Route definitions for staff-facing share link management.
//!
//! ```text
//! POST   /purchase-orders/{purchase_order_id}/share-link           create
//! PUT    /purchase-orders/{purchase_order_id}/share-link           configure
//! GET    /purchase-orders/{purchase_order_id}/share-link           get
//! POST   /purchase-orders/{purchase_order_id}/share-link/disable   disable
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::share_link;
use crate::state::AppState;

/// Share link admin routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/purchase-orders/{purchase_order_id}/share-link",
            post(share_link::create_share_link)
                .put(share_link::configure_share_link)
                .get(share_link::get_share_link),
        )
        .route(
            "/purchase-orders/{purchase_order_id}/share-link/disable",
            post(share_link::disable_share_link),
        )
}
