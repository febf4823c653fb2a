//! Route definitions for the public supplier portal.
//!
//! Every route is keyed by a share code in the path. Write operations take
//! the extract code in the request body; read operations take it as an
//! optional query parameter.
//!
//! ```text
//! POST   /{share_code}/verify                      verify_access
//! GET    /{share_code}/order-items                 list_order_items
//! GET    /{share_code}/supply-records              list_records
//! POST   /{share_code}/supply-records              create_record
//! GET    /{share_code}/supply-records/{record_id}  get_record
//! PUT    /{share_code}/supply-records/{record_id}  update_record
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// Portal routes, nested under `/portal`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{share_code}/verify", post(portal::verify_access))
        .route("/{share_code}/order-items", get(portal::list_order_items))
        .route(
            "/{share_code}/supply-records",
            get(portal::list_records).post(portal::create_record),
        )
        .route(
            "/{share_code}/supply-records/{record_id}",
            get(portal::get_record).put(portal::update_record),
        )
}
