//! Handlers for staff-facing share link management.
//!
//! Creating a link issues the share code (immutable from then on) and an
//! extract code; configuring changes expiry, extract code, and access limit
//! in place; disabling is permanent. The admin surface returns the full link
//! row, extract code included, so staff can distribute it.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::json;

use procura_core::audit::{categories, modules, operations, statuses, OPERATOR_SYSTEM};
use procura_core::error::CoreError;
use procura_core::share_code::{
    generate_extract_code, generate_share_code, validate_extract_code, MAX_GENERATION_ATTEMPTS,
};
use procura_core::types::DbId;
use procura_db::models::audit::CreateAuditLog;
use procura_db::models::share_link::{NewShareLink, ShareLinkSettings};
use procura_db::repositories::{PurchaseOrderRepo, ShareLinkRepo};

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/admin/purchase-orders/{purchase_order_id}/share-link
///
/// Issue a share link for a purchase order. Fails with 404 if the order
/// does not exist and 409 if a link (enabled or disabled) already exists;
/// existing links are reconfigured, never replaced.
pub async fn create_share_link(
    State(state): State<AppState>,
    Path(purchase_order_id): Path<DbId>,
    headers: HeaderMap,
    Json(input): Json<ShareLinkSettings>,
) -> AppResult<impl IntoResponse> {
    validate_settings(&input)?;

    if !PurchaseOrderRepo::exists(&state.pool, purchase_order_id).await? {
        return Err(CoreError::NotFound {
            entity: "PurchaseOrder",
            id: purchase_order_id,
        }
        .into());
    }

    if ShareLinkRepo::find_by_order(&state.pool, purchase_order_id)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(
            "A share link already exists for this purchase order; configure it instead"
                .to_string(),
        )
        .into());
    }

    let extract_code = match &input.extract_code {
        Some(code) => code.clone(),
        None => generate_extract_code(),
    };
    let expires_at = Utc::now() + Duration::hours(input.expires_in_hours);

    // Regenerate on the (vanishingly unlikely) share code collision.
    let mut last_err = None;
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let new_link = NewShareLink {
            purchase_order_id,
            share_code: generate_share_code(),
            extract_code: Some(extract_code.clone()),
            expires_at,
            access_limit: input.access_limit,
        };
        match ShareLinkRepo::create(&state.pool, &new_link).await {
            Ok(link) => {
                tracing::info!(
                    purchase_order_id,
                    share_code = %link.share_code,
                    expires_at = %link.expires_at,
                    "Share link created"
                );
                state.audit.record(CreateAuditLog {
                    category: categories::ADMIN.to_string(),
                    module: modules::SHARE_LINK.to_string(),
                    operation: operations::SHARE_CREATE.to_string(),
                    operator: operator(&headers),
                    status: statuses::SUCCESS.to_string(),
                    details: Some(json!({
                        "purchase_order_id": purchase_order_id,
                        "share_code": link.share_code.clone(),
                        "expires_at": link.expires_at,
                        "access_limit": link.access_limit,
                    })),
                    ip_address: None,
                });
                return Ok((StatusCode::CREATED, Json(ApiResponse::ok(link))));
            }
            Err(err) if is_share_code_collision(&err) => {
                last_err = Some(err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    match last_err {
        Some(err) => Err(err.into()),
        None => Err(AppError::InternalError(
            "share code generation loop made no attempt".to_string(),
        )),
    }
}

/// PUT /api/v1/admin/purchase-orders/{purchase_order_id}/share-link
///
/// Update expiry, extract code, and access limit on the existing link.
/// The share code and access count are never touched. Omitting the extract
/// code keeps the current one; disabled links cannot be reconfigured.
pub async fn configure_share_link(
    State(state): State<AppState>,
    Path(purchase_order_id): Path<DbId>,
    headers: HeaderMap,
    Json(input): Json<ShareLinkSettings>,
) -> AppResult<impl IntoResponse> {
    validate_settings(&input)?;

    let link = ShareLinkRepo::find_by_order(&state.pool, purchase_order_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ShareLink",
            id: purchase_order_id,
        })?;
    if link.disabled_at.is_some() {
        return Err(CoreError::Conflict("Share link is disabled".to_string()).into());
    }

    let extract_code = input
        .extract_code
        .clone()
        .or(link.extract_code)
        .unwrap_or_else(generate_extract_code);
    let expires_at = Utc::now() + Duration::hours(input.expires_in_hours);

    let configured = ShareLinkRepo::configure(
        &state.pool,
        purchase_order_id,
        &extract_code,
        expires_at,
        input.access_limit,
    )
    .await?
    // Lost a race with a concurrent disable.
    .ok_or_else(|| CoreError::Conflict("Share link is disabled".to_string()))?;

    tracing::info!(
        purchase_order_id,
        share_code = %configured.share_code,
        expires_at = %configured.expires_at,
        "Share link reconfigured"
    );
    state.audit.record(CreateAuditLog {
        category: categories::ADMIN.to_string(),
        module: modules::SHARE_LINK.to_string(),
        operation: operations::SHARE_CONFIGURE.to_string(),
        operator: operator(&headers),
        status: statuses::SUCCESS.to_string(),
        details: Some(json!({
            "purchase_order_id": purchase_order_id,
            "expires_at": configured.expires_at,
            "access_limit": configured.access_limit,
        })),
        ip_address: None,
    });

    Ok(Json(ApiResponse::ok(configured)))
}

/// POST /api/v1/admin/purchase-orders/{purchase_order_id}/share-link/disable
///
/// Permanently disable the link. Idempotent; there is no re-enable.
pub async fn disable_share_link(
    State(state): State<AppState>,
    Path(purchase_order_id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let link = ShareLinkRepo::disable(&state.pool, purchase_order_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ShareLink",
            id: purchase_order_id,
        })?;

    tracing::info!(
        purchase_order_id,
        share_code = %link.share_code,
        "Share link disabled"
    );
    state.audit.record(CreateAuditLog {
        category: categories::ADMIN.to_string(),
        module: modules::SHARE_LINK.to_string(),
        operation: operations::SHARE_DISABLE.to_string(),
        operator: operator(&headers),
        status: statuses::SUCCESS.to_string(),
        details: Some(json!({
            "purchase_order_id": purchase_order_id,
            "share_code": link.share_code.clone(),
        })),
        ip_address: None,
    });

    Ok(Json(ApiResponse::ok(link)))
}

/// GET /api/v1/admin/purchase-orders/{purchase_order_id}/share-link
///
/// Return the link regardless of expiry or disablement so the admin UI can
/// decide whether to reconfigure.
pub async fn get_share_link(
    State(state): State<AppState>,
    Path(purchase_order_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let link = ShareLinkRepo::find_by_order(&state.pool, purchase_order_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ShareLink",
            id: purchase_order_id,
        })?;

    Ok(Json(ApiResponse::ok(link)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate caller-supplied link settings.
fn validate_settings(input: &ShareLinkSettings) -> Result<(), AppError> {
    if input.expires_in_hours <= 0 {
        return Err(CoreError::Validation("expires_in_hours must be positive".to_string()).into());
    }
    if let Some(limit) = input.access_limit {
        if limit <= 0 {
            return Err(CoreError::Validation("access_limit must be positive".to_string()).into());
        }
    }
    if let Some(code) = &input.extract_code {
        validate_extract_code(code).map_err(CoreError::Validation)?;
    }
    Ok(())
}

/// Staff operator id forwarded by the upstream identity layer, if any.
pub(crate) fn operator(headers: &HeaderMap) -> String {
    headers
        .get("x-operator-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(OPERATOR_SYSTEM)
        .to_string()
}

/// True when an insert failed on the share code unique constraint
/// (as opposed to the one-link-per-order constraint).
fn is_share_code_collision(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_share_links_share_code")
    )
}
