//! Route definitions for staff-facing supply record administration.
//!
//! ```text
//! GET    /purchase-orders/{purchase_order_id}/supply-records   list all suppliers
//! POST   /supply-records/{record_id}/disable                   disable
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::supply_record;
use crate::state::AppState;

/// Supply record admin routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/purchase-orders/{purchase_order_id}/supply-records",
            get(supply_record::list_for_order),
        )
        .route(
            "/supply-records/{record_id}/disable",
            post(supply_record::disable_record),
        )
}
