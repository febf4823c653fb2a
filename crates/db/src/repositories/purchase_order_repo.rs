//! Read-only repository for the `purchase_orders` read model.

use sqlx::PgPool;

use procura_core::types::DbId;

use crate::models::purchase_order::{PurchaseOrder, PurchaseOrderItem};

/// Column list for purchase_orders queries.
const ORDER_COLUMNS: &str =
    "id, order_no, supplier_name, status_id, remark, created_at, updated_at";

/// Column list for purchase_order_items queries.
const ITEM_COLUMNS: &str = "id, purchase_order_id, product_id, product_name, \
    ordered_quantity, unit_price, created_at, updated_at";

/// Provides read operations over purchase orders and their line items.
///
/// Order CRUD belongs to the order-management module; this core only needs
/// existence checks and the allocation ceiling.
pub struct PurchaseOrderRepo;

impl PurchaseOrderRepo {
    /// Find a purchase order by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PurchaseOrder>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE id = $1");
        sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Check whether a purchase order exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM purchase_orders WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List the line items of a purchase order, ordered by product id.
    pub async fn list_items(
        pool: &PgPool,
        purchase_order_id: DbId,
    ) -> Result<Vec<PurchaseOrderItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM purchase_order_items \
             WHERE purchase_order_id = $1 \
             ORDER BY product_id ASC"
        );
        sqlx::query_as::<_, PurchaseOrderItem>(&query)
            .bind(purchase_order_id)
            .fetch_all(pool)
            .await
    }
}
