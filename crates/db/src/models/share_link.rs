//! Share link entity and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use procura_core::types::{DbId, Timestamp};

/// A row from the `share_links` table.
///
/// The full row (extract code included) is only ever serialized on the
/// staff-facing admin surface; portal responses never carry it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShareLink {
    pub id: DbId,
    pub purchase_order_id: DbId,
    pub share_code: String,
    pub extract_code: Option<String>,
    pub expires_at: Timestamp,
    pub access_limit: Option<i32>,
    pub access_count: i32,
    pub disabled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Caller-supplied settings, shared by create and configure.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareLinkSettings {
    pub expires_in_hours: i64,
    pub extract_code: Option<String>,
    pub access_limit: Option<i32>,
}

/// Insert DTO with the generated codes and computed expiry resolved.
#[derive(Debug, Clone)]
pub struct NewShareLink {
    pub purchase_order_id: DbId,
    pub share_code: String,
    pub extract_code: Option<String>,
    pub expires_at: Timestamp,
    pub access_limit: Option<i32>,
}
