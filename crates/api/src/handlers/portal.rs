//! Handlers for the public supplier portal.
//!
//! Every operation is keyed by a share code. Write operations re-run the
//! consuming access verification and then submit through the transactional
//! store, which re-checks the allocation ceiling under the per-order row
//! lock. Read operations use the non-consuming check.
//!
//! Denial reasons are logged server-side only; the caller always receives
//! the one generic "Access denied" envelope.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use procura_core::audit::{categories, modules, operations, statuses, OPERATOR_SYSTEM};
use procura_core::error::CoreError;
use procura_core::types::DbId;
use procura_db::models::audit::CreateAuditLog;
use procura_db::models::supply_record::{
    NewSupplyItem, SubmitOutcome, SubmitSupplyRecord, SupplierInfo,
};
use procura_db::repositories::{PurchaseOrderRepo, ShareLinkRepo, SupplyRecordRepo};
use procura_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// Body of the verify call.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub extract_code: Option<String>,
}

/// Successful verification payload.
#[derive(Debug, Serialize)]
pub struct VerifiedAccess {
    pub purchase_order_id: DbId,
}

/// Query parameters of the read-only portal endpoints.
#[derive(Debug, Deserialize)]
pub struct ReadAccessQuery {
    pub extract_code: Option<String>,
}

/// Body of a create or update submission.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub extract_code: Option<String>,
    pub supplier: SupplierInfo,
    pub items: Vec<NewSupplyItem>,
    pub total_amount: Option<Decimal>,
    pub remark: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/portal/{share_code}/verify
///
/// Consuming verification: checks the share code state and extract code and
/// atomically takes one access when a limit is configured. Returns the bound
/// purchase order id.
pub async fn verify_access(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<impl IntoResponse> {
    let verified = ShareLinkRepo::verify_and_consume(
        &state.pool,
        &share_code,
        input.extract_code.as_deref(),
    )
    .await?;
    let purchase_order_id = match verified {
        Some(id) => id,
        None => return Err(deny(&state.pool, &share_code, "verify").await),
    };

    tracing::info!(share_code = %share_code, purchase_order_id, "Share link verified");

    Ok(Json(ApiResponse::ok(VerifiedAccess { purchase_order_id })))
}

/// GET /api/v1/portal/{share_code}/order-items?extract_code=...
///
/// The purchase order lines the supplier can commit against. Read-only;
/// does not consume an access.
pub async fn list_order_items(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
    Query(query): Query<ReadAccessQuery>,
) -> AppResult<impl IntoResponse> {
    let purchase_order_id =
        check_read_access(&state.pool, &share_code, query.extract_code.as_deref()).await?;

    let items = PurchaseOrderRepo::list_items(&state.pool, purchase_order_id).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/v1/portal/{share_code}/supply-records?extract_code=...
///
/// The records previously submitted through this share link.
pub async fn list_records(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
    Query(query): Query<ReadAccessQuery>,
) -> AppResult<impl IntoResponse> {
    let purchase_order_id =
        check_read_access(&state.pool, &share_code, query.extract_code.as_deref()).await?;

    let records =
        SupplyRecordRepo::list_for_order(&state.pool, purchase_order_id, Some(&share_code))
            .await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/v1/portal/{share_code}/supply-records/{record_id}?extract_code=...
///
/// One record with its items.
pub async fn get_record(
    State(state): State<AppState>,
    Path((share_code, record_id)): Path<(String, DbId)>,
    Query(query): Query<ReadAccessQuery>,
) -> AppResult<impl IntoResponse> {
    let purchase_order_id =
        check_read_access(&state.pool, &share_code, query.extract_code.as_deref()).await?;

    let detail =
        SupplyRecordRepo::find_detail(&state.pool, record_id, purchase_order_id, &share_code)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SupplyRecord",
                id: record_id,
            })?;

    Ok(Json(ApiResponse::ok(detail)))
}

/// POST /api/v1/portal/{share_code}/supply-records
///
/// Submit a new supply record. Re-runs the consuming verification, then
/// validates and persists atomically under the per-order lock; an allocation
/// overflow returns one structured error per offending product and writes
/// nothing.
pub async fn create_record(
    State(state): State<AppState>,
    Path(share_code): Path<String>,
    headers: HeaderMap,
    Json(input): Json<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
    validate_submission(&input)?;

    let verified = ShareLinkRepo::verify_and_consume(
        &state.pool,
        &share_code,
        input.extract_code.as_deref(),
    )
    .await?;
    let purchase_order_id = match verified {
        Some(id) => id,
        None => return Err(deny(&state.pool, &share_code, "create supply record").await),
    };

    let submission = to_submission(purchase_order_id, &share_code, input);
    let outcome = SupplyRecordRepo::create(&state.pool, &submission).await?;

    match outcome {
        SubmitOutcome::Accepted(detail) => {
            tracing::info!(
                share_code = %share_code,
                purchase_order_id,
                supply_record_id = detail.record.id,
                "Supply record submitted"
            );
            state.audit.record(CreateAuditLog {
                category: categories::BUSINESS.to_string(),
                module: modules::SUPPLY_RECORD.to_string(),
                operation: operations::SUPPLY_SUBMIT.to_string(),
                operator: OPERATOR_SYSTEM.to_string(),
                status: statuses::SUCCESS.to_string(),
                details: Some(json!({
                    "purchase_order_id": purchase_order_id,
                    "supply_record_id": detail.record.id,
                    "share_code": share_code,
                    "item_count": detail.items.len(),
                    "client_ip": client_ip(&headers),
                })),
                ip_address: client_ip(&headers),
            });
            Ok((StatusCode::CREATED, Json(ApiResponse::ok(detail))))
        }
        SubmitOutcome::QuantityExceeded(breaches) => Err(AppError::QuantityExceeded(breaches)),
    }
}

/// PUT /api/v1/portal/{share_code}/supply-records/{record_id}
///
/// Replace a record wholesale: header fields and the complete item set.
/// Items omitted from the new payload are dropped. The record's own prior
/// quantities are excluded from the allocation re-check.
pub async fn update_record(
    State(state): State<AppState>,
    Path((share_code, record_id)): Path<(String, DbId)>,
    headers: HeaderMap,
    Json(input): Json<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
    validate_submission(&input)?;

    let verified = ShareLinkRepo::verify_and_consume(
        &state.pool,
        &share_code,
        input.extract_code.as_deref(),
    )
    .await?;
    let purchase_order_id = match verified {
        Some(id) => id,
        None => return Err(deny(&state.pool, &share_code, "update supply record").await),
    };

    let submission = to_submission(purchase_order_id, &share_code, input);
    let outcome = SupplyRecordRepo::update(&state.pool, record_id, &submission)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "SupplyRecord",
            id: record_id,
        })?;

    match outcome {
        SubmitOutcome::Accepted(detail) => {
            tracing::info!(
                share_code = %share_code,
                purchase_order_id,
                supply_record_id = record_id,
                "Supply record replaced"
            );
            state.audit.record(CreateAuditLog {
                category: categories::BUSINESS.to_string(),
                module: modules::SUPPLY_RECORD.to_string(),
                operation: operations::SUPPLY_UPDATE.to_string(),
                operator: OPERATOR_SYSTEM.to_string(),
                status: statuses::SUCCESS.to_string(),
                details: Some(json!({
                    "purchase_order_id": purchase_order_id,
                    "supply_record_id": record_id,
                    "share_code": share_code,
                    "item_count": detail.items.len(),
                    "client_ip": client_ip(&headers),
                })),
                ip_address: client_ip(&headers),
            });
            Ok(Json(ApiResponse::ok(detail)))
        }
        SubmitOutcome::QuantityExceeded(breaches) => Err(AppError::QuantityExceeded(breaches)),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Non-consuming access check for the read-only endpoints.
async fn check_read_access(
    pool: &DbPool,
    share_code: &str,
    extract_code: Option<&str>,
) -> Result<DbId, AppError> {
    match ShareLinkRepo::check_access(pool, share_code, extract_code).await? {
        Some(purchase_order_id) => Ok(purchase_order_id),
        None => Err(deny(pool, share_code, "read").await),
    }
}

/// Log the denial reason server-side, then hand back the generic denial.
///
/// The lookup is read-only and purely diagnostic; callers must never leak
/// the reason to the client.
async fn deny(pool: &DbPool, share_code: &str, context: &str) -> AppError {
    match ShareLinkRepo::find_by_share_code(pool, share_code).await {
        Ok(Some(link)) => {
            let reason = if link.disabled_at.is_some() {
                "disabled"
            } else if link.expires_at <= Utc::now() {
                "expired"
            } else if link
                .access_limit
                .is_some_and(|limit| link.access_count >= limit)
            {
                "access limit exhausted"
            } else {
                "extract code mismatch"
            };
            tracing::warn!(share_code, reason, context, "Share link access denied");
        }
        Ok(None) => {
            tracing::warn!(
                share_code,
                reason = "unknown share code",
                context,
                "Share link access denied"
            );
        }
        Err(err) => {
            tracing::warn!(share_code, error = %err, context, "Share link denial lookup failed");
        }
    }
    AppError::AccessDenied
}

/// Field-level validation of a submission body.
fn validate_submission(input: &SubmitRequest) -> Result<(), AppError> {
    let mut problems: Vec<String> = Vec::new();

    if input.supplier.name.trim().is_empty() {
        problems.push("supplier.name is required".to_string());
    }
    if input.supplier.contact_person.trim().is_empty() {
        problems.push("supplier.contact_person is required".to_string());
    }
    if input.supplier.contact_phone.trim().is_empty() {
        problems.push("supplier.contact_phone is required".to_string());
    }
    if input.items.is_empty() {
        problems.push("at least one item is required".to_string());
    }
    for (idx, item) in input.items.iter().enumerate() {
        if item.quantity <= 0 {
            problems.push(format!("items[{idx}].quantity must be positive"));
        }
        if item.unit_price < Decimal::ZERO {
            problems.push(format!("items[{idx}].unit_price must not be negative"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(problems.join("; ")).into())
    }
}

fn to_submission(
    purchase_order_id: DbId,
    share_code: &str,
    input: SubmitRequest,
) -> SubmitSupplyRecord {
    SubmitSupplyRecord {
        purchase_order_id,
        share_code: share_code.to_string(),
        supplier: input.supplier,
        items: input.items,
        total_amount: input.total_amount,
        remark: input.remark,
    }
}

/// Client IP as forwarded by the edge proxy, if any.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}
