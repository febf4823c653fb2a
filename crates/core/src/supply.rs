//! Supply record status values.
//!
//! `supply_records.status_id` is a SMALLINT; only active records count
//! towards the per-product allocation sum.

/// Lifecycle status of a supply record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyRecordStatus {
    Active,
    Disabled,
}

impl SupplyRecordStatus {
    /// The `status_id` column value for this status.
    pub fn id(self) -> i16 {
        match self {
            SupplyRecordStatus::Active => 1,
            SupplyRecordStatus::Disabled => 2,
        }
    }

    /// Map a `status_id` column value back to a status.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(SupplyRecordStatus::Active),
            2 => Some(SupplyRecordStatus::Disabled),
            _ => None,
        }
    }

    /// Human-readable name used in API responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SupplyRecordStatus::Active => "active",
            SupplyRecordStatus::Disabled => "disabled",
        }
    }
}
