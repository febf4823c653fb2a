//! Supply record entity models and DTOs.
//!
//! A supply record is a supplier's itemized delivery commitment against one
//! purchase order, created and amended exclusively through a verified share
//! link. Items are owned by their record and replaced wholesale on update.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use procura_core::allocation::AllocationBreach;
use procura_core::types::{DbId, Timestamp};

/// A row from the `supply_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupplyRecord {
    pub id: DbId,
    pub purchase_order_id: DbId,
    pub share_code: String,
    pub supplier_name: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub supplier_remark: Option<String>,
    pub total_amount: Decimal,
    pub remark: Option<String>,
    pub status_id: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `supply_record_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupplyRecordItem {
    pub id: DbId,
    pub supply_record_id: DbId,
    pub product_id: DbId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub remark: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Supplier contact details carried on the record header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierInfo {
    pub name: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub remark: Option<String>,
}

/// One line of a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplyItem {
    pub product_id: DbId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub remark: Option<String>,
}

/// DTO for creating or replacing a supply record.
///
/// `total_amount` defaults to the sum of the computed line totals when the
/// caller omits it.
#[derive(Debug, Clone)]
pub struct SubmitSupplyRecord {
    pub purchase_order_id: DbId,
    pub share_code: String,
    pub supplier: SupplierInfo,
    pub items: Vec<NewSupplyItem>,
    pub total_amount: Option<Decimal>,
    pub remark: Option<String>,
}

/// A record together with its items.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyRecordDetail {
    pub record: SupplyRecord,
    pub items: Vec<SupplyRecordItem>,
}

/// Result of a transactional create/replace attempt.
///
/// `QuantityExceeded` means the allocation re-check failed inside the
/// transaction and nothing was written.
#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted(SupplyRecordDetail),
    QuantityExceeded(Vec<AllocationBreach>),
}
