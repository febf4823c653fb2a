//! Repository for the `share_links` table.
//!
//! One link per purchase order; the share code is immutable once issued.
//! Verification is a single conditional UPDATE so the access counter can
//! never be over-consumed by concurrent callers.

use sqlx::PgPool;

use procura_core::types::{DbId, Timestamp};

use crate::models::share_link::{NewShareLink, ShareLink};

/// Column list for share_links queries.
const COLUMNS: &str = "id, purchase_order_id, share_code, extract_code, expires_at, \
    access_limit, access_count, disabled_at, created_at, updated_at";

/// Provides lifecycle and verification operations for share links.
pub struct ShareLinkRepo;

impl ShareLinkRepo {
    /// Insert a new share link, returning the created row.
    ///
    /// Fails with a `uq_share_links_purchase_order` or
    /// `uq_share_links_share_code` unique violation if the order already has
    /// a link or the generated code collides.
    pub async fn create(pool: &PgPool, input: &NewShareLink) -> Result<ShareLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO share_links
                (purchase_order_id, share_code, extract_code, expires_at, access_limit)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareLink>(&query)
            .bind(input.purchase_order_id)
            .bind(&input.share_code)
            .bind(&input.extract_code)
            .bind(input.expires_at)
            .bind(input.access_limit)
            .fetch_one(pool)
            .await
    }

    /// Find the link for a purchase order, regardless of state.
    pub async fn find_by_order(
        pool: &PgPool,
        purchase_order_id: DbId,
    ) -> Result<Option<ShareLink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM share_links WHERE purchase_order_id = $1");
        sqlx::query_as::<_, ShareLink>(&query)
            .bind(purchase_order_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a link by its share code, regardless of state.
    pub async fn find_by_share_code(
        pool: &PgPool,
        share_code: &str,
    ) -> Result<Option<ShareLink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM share_links WHERE share_code = $1");
        sqlx::query_as::<_, ShareLink>(&query)
            .bind(share_code)
            .fetch_optional(pool)
            .await
    }

    /// Update expiry, extract code, and access limit on an existing link.
    ///
    /// Never touches `share_code` or `access_count`, and refuses disabled
    /// links. Returns `None` when no enabled link exists for the order.
    pub async fn configure(
        pool: &PgPool,
        purchase_order_id: DbId,
        extract_code: &str,
        expires_at: Timestamp,
        access_limit: Option<i32>,
    ) -> Result<Option<ShareLink>, sqlx::Error> {
        let query = format!(
            "UPDATE share_links
             SET extract_code = $2, expires_at = $3, access_limit = $4, updated_at = NOW()
             WHERE purchase_order_id = $1 AND disabled_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareLink>(&query)
            .bind(purchase_order_id)
            .bind(extract_code)
            .bind(expires_at)
            .bind(access_limit)
            .fetch_optional(pool)
            .await
    }

    /// Permanently disable the link for a purchase order.
    ///
    /// Idempotent: a second call keeps the original `disabled_at`.
    pub async fn disable(
        pool: &PgPool,
        purchase_order_id: DbId,
    ) -> Result<Option<ShareLink>, sqlx::Error> {
        let query = format!(
            "UPDATE share_links
             SET disabled_at = COALESCE(disabled_at, NOW()), updated_at = NOW()
             WHERE purchase_order_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareLink>(&query)
            .bind(purchase_order_id)
            .fetch_optional(pool)
            .await
    }

    /// Verify a (share code, extract code) pair and consume one access.
    ///
    /// A single conditional UPDATE: the row must exist, be enabled, be
    /// unexpired, match the extract code when one is configured, and have
    /// remaining accesses when a limit is set. The increment and the checks
    /// are one statement, so concurrent verifications can never push
    /// `access_count` past `access_limit`.
    ///
    /// Returns the bound purchase order id, or `None` on any failure.
    /// Callers wanting the denial reason must look the row up separately.
    pub async fn verify_and_consume(
        pool: &PgPool,
        share_code: &str,
        extract_code: Option<&str>,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "UPDATE share_links
             SET access_count = access_count + 1, updated_at = NOW()
             WHERE share_code = $1
               AND disabled_at IS NULL
               AND expires_at > NOW()
               AND (extract_code IS NULL OR extract_code = $2)
               AND (access_limit IS NULL OR access_count < access_limit)
             RETURNING purchase_order_id",
        )
        .bind(share_code)
        .bind(extract_code)
        .fetch_optional(pool)
        .await
    }

    /// Validate a (share code, extract code) pair without consuming an access.
    ///
    /// Same predicates as [`Self::verify_and_consume`] minus the access
    /// limit and the counter increment: the limit meters verifications, not
    /// read-backs. Used by read-only portal projections.
    pub async fn check_access(
        pool: &PgPool,
        share_code: &str,
        extract_code: Option<&str>,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT purchase_order_id FROM share_links
             WHERE share_code = $1
               AND disabled_at IS NULL
               AND expires_at > NOW()
               AND (extract_code IS NULL OR extract_code = $2)",
        )
        .bind(share_code)
        .bind(extract_code)
        .fetch_optional(pool)
        .await
    }
}
