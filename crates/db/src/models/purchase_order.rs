//! Purchase order read model.
//!
//! Purchase orders are owned by the order-management module; this core only
//! reads them. The line items are the source of truth for the per-product
//! allocation ceiling.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use procura_core::types::{DbId, Timestamp};

/// A row from the `purchase_orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PurchaseOrder {
    pub id: DbId,
    pub order_no: String,
    pub supplier_name: Option<String>,
    pub status_id: i16,
    pub remark: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `purchase_order_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PurchaseOrderItem {
    pub id: DbId,
    pub purchase_order_id: DbId,
    pub product_id: DbId,
    pub product_name: Option<String>,
    pub ordered_quantity: i64,
    pub unit_price: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
