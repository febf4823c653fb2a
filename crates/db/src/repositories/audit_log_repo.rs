//! Repository for the `audit_logs` table.
//!
//! Append-only. Inserts are issued by the API layer's fire-and-forget sink;
//! an insert failure must never surface to the business operation.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

/// Column list for audit_logs queries.
const COLUMNS: &str =
    "id, category, module, operation, operator, status, details, ip_address, created_at";

/// Provides insert and query operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Insert a new audit log entry, returning the created row.
    pub async fn insert(pool: &PgPool, input: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs
                (category, module, operation, operator, status, details, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&input.category)
            .bind(&input.module)
            .bind(&input.operation)
            .bind(&input.operator)
            .bind(&input.status)
            .bind(&input.details)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// List the most recent entries, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(limit.min(500))
            .fetch_all(pool)
            .await
    }
}
