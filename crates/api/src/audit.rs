//! Fire-and-forget audit sink.
//!
//! Business operations record audit entries after they succeed; the write
//! happens on a detached task so a slow or failing audit store can never
//! block or roll back the operation that triggered it.

use procura_db::models::audit::CreateAuditLog;
use procura_db::repositories::AuditLogRepo;
use procura_db::DbPool;

/// Cloneable handle for appending audit log entries.
#[derive(Clone)]
pub struct AuditSink {
    pool: DbPool,
}

impl AuditSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append an entry, detached from the calling request.
    ///
    /// Insert failures are logged at `warn` and dropped.
    pub fn record(&self, entry: CreateAuditLog) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(err) = AuditLogRepo::insert(&pool, &entry).await {
                tracing::warn!(
                    error = %err,
                    module = %entry.module,
                    operation = %entry.operation,
                    "Audit log write failed"
                );
            }
        });
    }
}
