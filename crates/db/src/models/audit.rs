//! Audit log entity model and DTO.
//!
//! Audit logs are append-only (no `updated_at`) and written best-effort:
//! the caller never waits on, or fails because of, an audit insert.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use procura_core::types::{DbId, Timestamp};

/// A single audit log entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub category: String,
    pub module: String,
    pub operation: String,
    pub operator: String,
    pub status: String,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditLog {
    pub category: String,
    pub module: String,
    pub operation: String,
    pub operator: String,
    pub status: String,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}
