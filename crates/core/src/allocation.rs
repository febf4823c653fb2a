//! Per-product quantity allocation checking.
//!
//! A purchase order line fixes the ceiling for each product; supply records
//! from any number of suppliers commit quantities against it. This module
//! holds the pure arithmetic: given the ordered quantities, the quantities
//! already committed by other active records, and a candidate submission,
//! report every product whose ceiling would be exceeded.
//!
//! The caller is responsible for snapshot consistency: the maps must be read
//! inside the same serializing transaction that performs the write, otherwise
//! two concurrent submissions can both pass against stale sums.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::DbId;

/// One line of a candidate submission.
#[derive(Debug, Clone)]
pub struct CandidateItem {
    pub product_id: DbId,
    pub quantity: i64,
}

/// A product whose committed total would exceed the ordered quantity.
///
/// `max_allowed` is what the submission could still request for this product
/// (never negative). Serialized verbatim into validation error responses so
/// the client can highlight the offending rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationBreach {
    pub product_id: DbId,
    pub ordered_quantity: i64,
    pub already_committed: i64,
    pub requested: i64,
    pub max_allowed: i64,
}

/// Check a candidate submission against the per-product allocation ceiling.
///
/// `ordered` maps product id to the ordered quantity on the purchase order.
/// `committed` maps product id to the quantity already committed by other
/// active supply records (the record being edited must already be excluded).
///
/// Candidate lines repeating a product are summed before checking. A product
/// absent from the order breaches with `ordered_quantity = 0`.
///
/// Returns one breach per offending product, ordered by product id; an empty
/// vector means the submission fits.
pub fn check_allocation(
    ordered: &HashMap<DbId, i64>,
    committed: &HashMap<DbId, i64>,
    candidates: &[CandidateItem],
) -> Vec<AllocationBreach> {
    let mut requested: HashMap<DbId, i64> = HashMap::new();
    for item in candidates {
        *requested.entry(item.product_id).or_insert(0) += item.quantity;
    }

    let mut breaches: Vec<AllocationBreach> = Vec::new();
    for (&product_id, &quantity) in &requested {
        let ordered_quantity = ordered.get(&product_id).copied().unwrap_or(0);
        let already_committed = committed.get(&product_id).copied().unwrap_or(0);

        if already_committed + quantity > ordered_quantity {
            breaches.push(AllocationBreach {
                product_id,
                ordered_quantity,
                already_committed,
                requested: quantity,
                max_allowed: (ordered_quantity - already_committed).max(0),
            });
        }
    }

    breaches.sort_by_key(|b| b.product_id);
    breaches
}
