//! Repository for the `supply_records` and `supply_record_items` tables.
//!
//! Create and replace run entirely inside one transaction that first takes a
//! row lock on the purchase order (`SELECT ... FOR UPDATE`), so the
//! allocation re-check and the subsequent writes are serialized per order.
//! Submissions for different orders proceed in parallel. Nothing is written
//! when the re-check fails.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use procura_core::allocation::{check_allocation, CandidateItem};
use procura_core::supply::SupplyRecordStatus;
use procura_core::types::DbId;

use crate::models::supply_record::{
    NewSupplyItem, SubmitOutcome, SubmitSupplyRecord, SupplyRecord, SupplyRecordDetail,
    SupplyRecordItem,
};

/// Column list for supply_records queries.
const RECORD_COLUMNS: &str = "id, purchase_order_id, share_code, supplier_name, \
    contact_person, contact_phone, supplier_remark, total_amount, remark, status_id, \
    created_at, updated_at";

/// Column list for supply_record_items queries.
const ITEM_COLUMNS: &str = "id, supply_record_id, product_id, quantity, unit_price, \
    total_price, remark, created_at, updated_at";

/// Provides transactional create/replace/read operations for supply records.
pub struct SupplyRecordRepo;

impl SupplyRecordRepo {
    /// Create a supply record with its items.
    ///
    /// Locks the purchase order row, re-checks the allocation ceiling
    /// against all active records, then inserts header and items; commits
    /// only on success. A failed re-check rolls back and returns the breach
    /// list untouched by any write.
    pub async fn create(
        pool: &PgPool,
        input: &SubmitSupplyRecord,
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        lock_order(&mut tx, input.purchase_order_id).await?;

        let ordered = load_ordered_quantities(&mut tx, input.purchase_order_id).await?;
        let committed =
            load_committed_quantities(&mut tx, input.purchase_order_id, None).await?;

        let breaches = check_allocation(&ordered, &committed, &candidates(&input.items));
        if !breaches.is_empty() {
            // Dropping the transaction rolls it back; nothing was written.
            return Ok(SubmitOutcome::QuantityExceeded(breaches));
        }

        let total_amount = input
            .total_amount
            .unwrap_or_else(|| items_total(&input.items));

        let query = format!(
            "INSERT INTO supply_records
                (purchase_order_id, share_code, supplier_name, contact_person,
                 contact_phone, supplier_remark, total_amount, remark, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {RECORD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SupplyRecord>(&query)
            .bind(input.purchase_order_id)
            .bind(&input.share_code)
            .bind(&input.supplier.name)
            .bind(&input.supplier.contact_person)
            .bind(&input.supplier.contact_phone)
            .bind(&input.supplier.remark)
            .bind(total_amount)
            .bind(&input.remark)
            .bind(SupplyRecordStatus::Active.id())
            .fetch_one(&mut *tx)
            .await?;

        let items = insert_items(&mut tx, record.id, &input.items).await?;

        tx.commit().await?;

        tracing::debug!(
            purchase_order_id = input.purchase_order_id,
            supply_record_id = record.id,
            item_count = items.len(),
            "Supply record created"
        );

        Ok(SubmitOutcome::Accepted(SupplyRecordDetail { record, items }))
    }

    /// Replace a supply record's header fields and full item set.
    ///
    /// The record must exist, belong to the given order and share code, and
    /// be active; returns `None` otherwise. Re-validates quantities with the
    /// record's own items excluded from the committed sum, then deletes all
    /// prior items and inserts the new set in the same transaction.
    pub async fn update(
        pool: &PgPool,
        record_id: DbId,
        input: &SubmitSupplyRecord,
    ) -> Result<Option<SubmitOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        lock_order(&mut tx, input.purchase_order_id).await?;

        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM supply_records
             WHERE id = $1 AND purchase_order_id = $2 AND share_code = $3 AND status_id = $4"
        );
        let existing = sqlx::query_as::<_, SupplyRecord>(&query)
            .bind(record_id)
            .bind(input.purchase_order_id)
            .bind(&input.share_code)
            .bind(SupplyRecordStatus::Active.id())
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let ordered = load_ordered_quantities(&mut tx, input.purchase_order_id).await?;
        let committed =
            load_committed_quantities(&mut tx, input.purchase_order_id, Some(record_id)).await?;

        let breaches = check_allocation(&ordered, &committed, &candidates(&input.items));
        if !breaches.is_empty() {
            return Ok(Some(SubmitOutcome::QuantityExceeded(breaches)));
        }

        let total_amount = input
            .total_amount
            .unwrap_or_else(|| items_total(&input.items));

        let query = format!(
            "UPDATE supply_records
             SET supplier_name = $2, contact_person = $3, contact_phone = $4,
                 supplier_remark = $5, total_amount = $6, remark = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {RECORD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SupplyRecord>(&query)
            .bind(record_id)
            .bind(&input.supplier.name)
            .bind(&input.supplier.contact_person)
            .bind(&input.supplier.contact_phone)
            .bind(&input.supplier.remark)
            .bind(total_amount)
            .bind(&input.remark)
            .fetch_one(&mut *tx)
            .await?;

        // Full replacement: drop every prior item, then insert the new set.
        sqlx::query("DELETE FROM supply_record_items WHERE supply_record_id = $1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        let items = insert_items(&mut tx, record_id, &input.items).await?;

        tx.commit().await?;

        tracing::debug!(
            purchase_order_id = input.purchase_order_id,
            supply_record_id = record_id,
            item_count = items.len(),
            "Supply record replaced"
        );

        Ok(Some(SubmitOutcome::Accepted(SupplyRecordDetail {
            record,
            items,
        })))
    }

    /// List records for an order, newest first.
    ///
    /// With `share_code` set, restricts to records submitted through that
    /// link (the portal view); `None` lists all suppliers (the admin view).
    pub async fn list_for_order(
        pool: &PgPool,
        purchase_order_id: DbId,
        share_code: Option<&str>,
    ) -> Result<Vec<SupplyRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM supply_records
             WHERE purchase_order_id = $1
               AND ($2::TEXT IS NULL OR share_code = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SupplyRecord>(&query)
            .bind(purchase_order_id)
            .bind(share_code)
            .fetch_all(pool)
            .await
    }

    /// Fetch a record and its items by id, order, and share code.
    pub async fn find_detail(
        pool: &PgPool,
        record_id: DbId,
        purchase_order_id: DbId,
        share_code: &str,
    ) -> Result<Option<SupplyRecordDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM supply_records
             WHERE id = $1 AND purchase_order_id = $2 AND share_code = $3"
        );
        let record = sqlx::query_as::<_, SupplyRecord>(&query)
            .bind(record_id)
            .bind(purchase_order_id)
            .bind(share_code)
            .fetch_optional(pool)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM supply_record_items
             WHERE supply_record_id = $1
             ORDER BY product_id ASC, id ASC"
        );
        let items = sqlx::query_as::<_, SupplyRecordItem>(&query)
            .bind(record.id)
            .fetch_all(pool)
            .await?;

        Ok(Some(SupplyRecordDetail { record, items }))
    }

    /// Administratively disable a record, freeing its quantities.
    ///
    /// Returns `None` if the record does not exist or is already disabled.
    pub async fn disable(pool: &PgPool, record_id: DbId) -> Result<Option<SupplyRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE supply_records
             SET status_id = $2, updated_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, SupplyRecord>(&query)
            .bind(record_id)
            .bind(SupplyRecordStatus::Disabled.id())
            .bind(SupplyRecordStatus::Active.id())
            .fetch_optional(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Transaction-scoped helpers
// ---------------------------------------------------------------------------

/// Take the per-order row lock that serializes allocation checks.
///
/// Fails with `RowNotFound` when the purchase order does not exist.
async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    purchase_order_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM purchase_orders WHERE id = $1 FOR UPDATE")
        .bind(purchase_order_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(())
}

/// Ordered quantity per product for the order.
async fn load_ordered_quantities(
    tx: &mut Transaction<'_, Postgres>,
    purchase_order_id: DbId,
) -> Result<HashMap<DbId, i64>, sqlx::Error> {
    let rows: Vec<(DbId, i64)> = sqlx::query_as(
        "SELECT product_id, ordered_quantity FROM purchase_order_items \
         WHERE purchase_order_id = $1",
    )
    .bind(purchase_order_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Quantity already committed per product across active records on the
/// order, optionally excluding one record (the one being replaced).
async fn load_committed_quantities(
    tx: &mut Transaction<'_, Postgres>,
    purchase_order_id: DbId,
    exclude_record_id: Option<DbId>,
) -> Result<HashMap<DbId, i64>, sqlx::Error> {
    let rows: Vec<(DbId, i64)> = sqlx::query_as(
        "SELECT i.product_id, COALESCE(SUM(i.quantity), 0)::BIGINT
         FROM supply_record_items i
         JOIN supply_records r ON r.id = i.supply_record_id
         WHERE r.purchase_order_id = $1
           AND r.status_id = $2
           AND ($3::BIGINT IS NULL OR r.id <> $3)
         GROUP BY i.product_id",
    )
    .bind(purchase_order_id)
    .bind(SupplyRecordStatus::Active.id())
    .bind(exclude_record_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Insert the item set for a record, computing line totals server-side.
async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    supply_record_id: DbId,
    items: &[NewSupplyItem],
) -> Result<Vec<SupplyRecordItem>, sqlx::Error> {
    let query = format!(
        "INSERT INTO supply_record_items
            (supply_record_id, product_id, quantity, unit_price, total_price, remark)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {ITEM_COLUMNS}"
    );

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, SupplyRecordItem>(&query)
            .bind(supply_record_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(line_total(item))
            .bind(&item.remark)
            .fetch_one(&mut **tx)
            .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

fn candidates(items: &[NewSupplyItem]) -> Vec<CandidateItem> {
    items
        .iter()
        .map(|i| CandidateItem {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect()
}

fn line_total(item: &NewSupplyItem) -> Decimal {
    item.unit_price * Decimal::from(item.quantity)
}

fn items_total(items: &[NewSupplyItem]) -> Decimal {
    items.iter().map(line_total).sum()
}
