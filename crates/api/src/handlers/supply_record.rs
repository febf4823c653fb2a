//! Handlers for staff-facing supply record administration.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use procura_core::audit::{categories, modules, operations, statuses};
use procura_core::error::CoreError;
use procura_core::types::DbId;
use procura_db::models::audit::CreateAuditLog;
use procura_db::repositories::{PurchaseOrderRepo, SupplyRecordRepo};

use crate::error::AppResult;
use crate::handlers::share_link::operator;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/admin/purchase-orders/{purchase_order_id}/supply-records
///
/// List every supplier's records for an order, across all share links.
pub async fn list_for_order(
    State(state): State<AppState>,
    Path(purchase_order_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !PurchaseOrderRepo::exists(&state.pool, purchase_order_id).await? {
        return Err(CoreError::NotFound {
            entity: "PurchaseOrder",
            id: purchase_order_id,
        }
        .into());
    }

    let records = SupplyRecordRepo::list_for_order(&state.pool, purchase_order_id, None).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// POST /api/v1/admin/supply-records/{record_id}/disable
///
/// Administratively disable a record. Its quantities stop counting towards
/// the allocation ceiling and the portal can no longer amend it.
pub async fn disable_record(
    State(state): State<AppState>,
    Path(record_id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let record = SupplyRecordRepo::disable(&state.pool, record_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "SupplyRecord",
            id: record_id,
        })?;

    tracing::info!(
        supply_record_id = record_id,
        purchase_order_id = record.purchase_order_id,
        "Supply record disabled"
    );
    state.audit.record(CreateAuditLog {
        category: categories::ADMIN.to_string(),
        module: modules::SUPPLY_RECORD.to_string(),
        operation: operations::SUPPLY_DISABLE.to_string(),
        operator: operator(&headers),
        status: statuses::SUCCESS.to_string(),
        details: Some(json!({
            "supply_record_id": record_id,
            "purchase_order_id": record.purchase_order_id,
        })),
        ip_address: None,
    });

    Ok(Json(ApiResponse::ok(record)))
}
